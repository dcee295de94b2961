use super::*;

use std::collections::HashMap;

use tempfile::tempdir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_match_demo_timings() {
    let settings = Settings::default();
    assert_eq!(settings.timing.line_interval, Duration::from_secs(2));
    assert_eq!(settings.timing.teardown_delay, Duration::from_secs(3));
    assert_eq!(settings.locale(), ScriptLocale::Hindi);
    assert_eq!(settings.load_orders().expect("seed").len(), 3);
}

#[test]
fn file_values_are_applied_then_env_wins() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("call_agent.toml");
    fs::write(
        &path,
        "line_interval_ms = 500\nteardown_delay_ms = 750\nlocale = \"en\"\n",
    )
    .expect("write settings");

    let settings = load_settings_with_env(
        Some(&path),
        env_from(&[("APP__TEARDOWN_DELAY_MS", "10")]),
    )
    .expect("load");

    assert_eq!(settings.timing.line_interval, Duration::from_millis(500));
    assert_eq!(settings.timing.teardown_delay, Duration::from_millis(10));
    assert_eq!(settings.locale, Some(ScriptLocale::English));
}

#[test]
fn invalid_env_values_are_ignored() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").expect("write settings");

    let settings = load_settings_with_env(
        Some(&path),
        env_from(&[
            ("APP__LINE_INTERVAL_MS", "fast"),
            ("APP__LOCALE", "klingon"),
        ]),
    )
    .expect("load");

    assert_eq!(settings.timing, SessionTiming::default());
    assert_eq!(settings.locale, None);
    assert_eq!(settings.locale(), ScriptLocale::Hindi);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let err = load_settings_with_env(Some(&dir.path().join("nope.toml")), env_from(&[]))
        .expect_err("missing file");
    assert!(err.to_string().contains("failed to read settings file"));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(parse_settings_file("line_interval = 5").is_err());
}

#[test]
fn orders_file_replaces_seed() {
    let dir = tempdir().expect("temp dir");
    let orders_path = dir.path().join("orders.toml");
    fs::write(
        &orders_path,
        r#"
        [[orders]]
        order_id = "OD77"
        customer_name = "Meera Iyer"
        phone_number = "+91 90000 12345"
        items = ["Pressure Cooker"]
        total_amount = 2499
        delivery_address = "12, Lake View, Chennai - 600001"
        "#,
    )
    .expect("write orders");

    let orders_path = orders_path.to_string_lossy().to_string();
    let empty = dir.path().join("empty.toml");
    fs::write(&empty, "").expect("write settings");
    let settings =
        load_settings_with_env(Some(&empty), env_from(&[("APP__ORDERS_FILE", orders_path.as_str())]))
            .expect("load");
    let orders = settings.load_orders().expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id.as_str(), "OD77");
}
