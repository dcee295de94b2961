//! Status colors and glyphs.

use call_core::view::{StatusBadge, StatusIcon, StatusTone};
use eframe::egui::Color32;

pub const BRAND_BLUE: Color32 = Color32::from_rgb(40, 116, 240);
pub const PANEL_FILL: Color32 = Color32::from_rgb(245, 247, 252);

pub fn tone_color(tone: StatusTone) -> Color32 {
    match tone {
        StatusTone::Waiting => Color32::from_rgb(202, 138, 4),
        StatusTone::Active => Color32::from_rgb(37, 99, 235),
        StatusTone::Success => Color32::from_rgb(22, 163, 74),
        StatusTone::Failure => Color32::from_rgb(220, 38, 38),
        StatusTone::Muted => Color32::from_rgb(75, 85, 99),
    }
}

pub fn icon_glyph(icon: StatusIcon) -> &'static str {
    match icon {
        StatusIcon::Clock => "🕑",
        StatusIcon::Phone => "📞",
        StatusIcon::Check => "✔",
        StatusIcon::Cross => "✖",
    }
}

/// Badge color, pulsed over `time` seconds for animated badges.
pub fn badge_color(badge: StatusBadge, time: f64) -> Color32 {
    let base = tone_color(badge.tone);
    if !badge.animated {
        return base;
    }
    let alpha = 0.55 + 0.45 * ((time * std::f64::consts::TAU).sin() * 0.5 + 0.5);
    base.gamma_multiply(alpha as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_core::view::status_badge;
    use shared::domain::OrderStatus;

    #[test]
    fn static_badges_ignore_time() {
        let badge = status_badge(OrderStatus::Confirmed);
        assert_eq!(badge_color(badge, 0.0), badge_color(badge, 0.37));
        assert_eq!(badge_color(badge, 0.0), tone_color(StatusTone::Success));
    }

    #[test]
    fn glyphs_are_distinct_per_icon() {
        let glyphs = [
            icon_glyph(StatusIcon::Clock),
            icon_glyph(StatusIcon::Phone),
            icon_glyph(StatusIcon::Check),
            icon_glyph(StatusIcon::Cross),
        ];
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
