//! Built-in demo orders and the optional TOML orders file that replaces them.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::domain::{Order, OrderId, OrderStatus};

pub fn sample_orders() -> Vec<Order> {
    vec![
        Order {
            order_id: OrderId::new("OD12345678"),
            customer_name: "Rajesh Kumar".to_string(),
            phone_number: "+91 98765 43210".to_string(),
            items: vec![
                "Samsung Galaxy M32".to_string(),
                "Boat Headphones".to_string(),
            ],
            total_amount: 15999,
            delivery_address: "123, MG Road, Bangalore - 560001".to_string(),
            status: OrderStatus::Pending,
        },
        Order {
            order_id: OrderId::new("OD12345679"),
            customer_name: "Priya Sharma".to_string(),
            phone_number: "+91 98765 43211".to_string(),
            items: vec!["Nike Sports Shoes".to_string(), "Adidas T-Shirt".to_string()],
            total_amount: 4599,
            delivery_address: "456, Nehru Nagar, Mumbai - 400001".to_string(),
            status: OrderStatus::Pending,
        },
        Order {
            order_id: OrderId::new("OD12345680"),
            customer_name: "Amit Patel".to_string(),
            phone_number: "+91 98765 43212".to_string(),
            items: vec!["HP Laptop".to_string(), "Logitech Mouse".to_string()],
            total_amount: 45999,
            delivery_address: "789, Ring Road, Delhi - 110001".to_string(),
            status: OrderStatus::Confirmed,
        },
    ]
}

#[derive(Debug, Deserialize)]
struct OrdersFile {
    #[serde(default)]
    orders: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    order_id: String,
    customer_name: String,
    phone_number: String,
    #[serde(default)]
    items: Vec<String>,
    total_amount: u64,
    delivery_address: String,
    #[serde(default = "default_status")]
    status: OrderStatus,
}

fn default_status() -> OrderStatus {
    OrderStatus::Pending
}

pub fn parse_orders(raw: &str) -> Result<Vec<Order>> {
    let file: OrdersFile = toml::from_str(raw).context("malformed orders file")?;

    let mut seen = HashSet::new();
    let mut orders = Vec::with_capacity(file.orders.len());
    for record in file.orders {
        if record.order_id.trim().is_empty() {
            bail!("order with empty order_id");
        }
        if !seen.insert(record.order_id.clone()) {
            bail!("duplicate order_id {}", record.order_id);
        }
        if record.status == OrderStatus::Calling {
            bail!(
                "order {} cannot start in the calling state",
                record.order_id
            );
        }
        orders.push(Order {
            order_id: OrderId(record.order_id),
            customer_name: record.customer_name,
            phone_number: record.phone_number,
            items: record.items,
            total_amount: record.total_amount,
            delivery_address: record.delivery_address,
            status: record.status,
        });
    }

    Ok(orders)
}

pub fn load_orders_file(path: &Path) -> Result<Vec<Order>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read orders file {}", path.display()))?;
    parse_orders(&raw).with_context(|| format!("invalid orders file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_orders_have_unique_ids() {
        let orders = sample_orders();
        let ids: HashSet<_> = orders.iter().map(|o| o.order_id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(
            orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
            2
        );
    }

    #[test]
    fn parses_orders_with_default_pending_status() {
        let orders = parse_orders(
            r#"
            [[orders]]
            order_id = "OD1"
            customer_name = "Test Customer"
            phone_number = "+91 90000 00000"
            items = ["Kettle"]
            total_amount = 1299
            delivery_address = "1, Test Lane, Pune - 411001"

            [[orders]]
            order_id = "OD2"
            customer_name = "Other Customer"
            phone_number = "+91 90000 00001"
            total_amount = 50
            delivery_address = "2, Test Lane, Pune - 411001"
            status = "no-response"
            "#,
        )
        .expect("parse orders");

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].items, vec!["Kettle".to_string()]);
        assert_eq!(orders[1].status, OrderStatus::NoResponse);
        assert!(orders[1].items.is_empty());
    }

    #[test]
    fn rejects_duplicate_and_mid_call_orders() {
        let duplicate = r#"
            [[orders]]
            order_id = "OD1"
            customer_name = "A"
            phone_number = "1"
            total_amount = 1
            delivery_address = "x"

            [[orders]]
            order_id = "OD1"
            customer_name = "B"
            phone_number = "2"
            total_amount = 2
            delivery_address = "y"
        "#;
        let err = parse_orders(duplicate).expect_err("duplicate ids");
        assert!(err.to_string().contains("duplicate order_id OD1"));

        let calling = r#"
            [[orders]]
            order_id = "OD9"
            customer_name = "A"
            phone_number = "1"
            total_amount = 1
            delivery_address = "x"
            status = "calling"
        "#;
        assert!(parse_orders(calling).is_err());
    }
}
