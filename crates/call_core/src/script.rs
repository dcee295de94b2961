//! Scripted dialogue for the simulated confirmation call.

use serde::{Deserialize, Serialize};
use shared::domain::{CallOutcome, Order};

pub const AGENT_LINE_COUNT: usize = 7;
pub const CLOSING_LINE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptLocale {
    #[default]
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "en")]
    English,
}

impl ScriptLocale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hi" | "hindi" => Some(ScriptLocale::Hindi),
            "en" | "english" => Some(ScriptLocale::English),
            _ => None,
        }
    }
}

/// Formats whole rupees with Indian digit grouping: `1,23,456`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, back) = rest.split_at(rest.len() - 2);
        groups.push(back);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

pub fn format_rupees(amount: u64) -> String {
    format!("₹{}", format_inr(amount))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CallScript {
    locale: ScriptLocale,
}

impl CallScript {
    pub fn new(locale: ScriptLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> ScriptLocale {
        self.locale
    }

    /// The agent's side of the call, revealed one line per tick.
    pub fn agent_lines(&self, order: &Order) -> Vec<String> {
        let items = order.items.join(", ");
        let amount = format_rupees(order.total_amount);
        match self.locale {
            ScriptLocale::Hindi => vec![
                "📞 कॉल शुरू हो रही है...".to_string(),
                format!(
                    "🤖 नमस्ते {} जी, मैं Flipkart की तरफ से बोल रहा हूं।",
                    order.customer_name
                ),
                format!("📦 आपका ऑर्डर नंबर {} है।", order.order_id),
                format!("🛍️ आपने {items} ऑर्डर किया है।"),
                format!("💰 कुल राशि {amount} है।"),
                format!("📍 डिलीवरी एड्रेस: {}", order.delivery_address),
                "❓ क्या आप इस ऑर्डर को कन्फर्म करना चाहते हैं?".to_string(),
            ],
            ScriptLocale::English => vec![
                "📞 Call connecting...".to_string(),
                format!(
                    "🤖 Hello {}, I am calling on behalf of Flipkart.",
                    order.customer_name
                ),
                format!("📦 Your order number is {}.", order.order_id),
                format!("🛍️ You ordered {items}."),
                format!("💰 The total amount is {amount}."),
                format!("📍 Delivery address: {}", order.delivery_address),
                "❓ Would you like to confirm this order?".to_string(),
            ],
        }
    }

    pub fn closing_lines(&self, outcome: CallOutcome) -> Vec<String> {
        let lines: [&str; CLOSING_LINE_COUNT] = match (self.locale, outcome) {
            (ScriptLocale::Hindi, CallOutcome::Confirmed) => [
                "✅ धन्यवाद! आपका ऑर्डर कन्फर्म हो गया है।",
                "🚚 डिलीवरी 2-3 दिन में होगी।",
                "📞 कॉल समाप्त हो रही है...",
            ],
            (ScriptLocale::Hindi, CallOutcome::Cancelled) => [
                "❌ ठीक है, आपका ऑर्डर कैंसल कर दिया गया है।",
                "💳 रिफंड 5-7 दिनों में मिलेगा।",
                "📞 कॉल समाप्त हो रही है...",
            ],
            (ScriptLocale::English, CallOutcome::Confirmed) => [
                "✅ Thank you! Your order has been confirmed.",
                "🚚 Delivery will take 2-3 days.",
                "📞 Ending the call...",
            ],
            (ScriptLocale::English, CallOutcome::Cancelled) => [
                "❌ Okay, your order has been cancelled.",
                "💳 The refund will reach you in 5-7 days.",
                "📞 Ending the call...",
            ],
        };
        lines.iter().map(|line| line.to_string()).collect()
    }
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
