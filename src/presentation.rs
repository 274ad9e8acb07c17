//! Admin display formatting for canonical orders. Pure functions, no business rules.

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::domain::aggregates::{Order, NOT_AVAILABLE};
use crate::services::checkout::line_item_name;

pub const ADDRESS_WIDTH: usize = 40;
pub const PRODUCT_LINE_WIDTH: usize = 48;

const ELLIPSIS: char = '…';

/// Minor units to a display amount, e.g. `1234` to `"$12.34"`.
pub fn format_currency(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Greedy word wrap. Words longer than `width` are split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            let piece_len = piece.len();
            let needed = if current_len == 0 { piece_len } else { current_len + 1 + piece_len };
            if needed > width && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Cuts to at most `max` characters, ending in an ellipsis when anything was dropped.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push(ELLIPSIS);
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge { Green, Amber, Blue, Red, Grey }

/// Delivery statuses are free-form, so anything unrecognised is grey.
pub fn status_badge(status: &str) -> Badge {
    match status.trim().to_ascii_lowercase().as_str() {
        "completed" | "delivered" | "paid" => Badge::Green,
        "pending" => Badge::Amber,
        "processing" | "shipped" | "out_for_delivery" => Badge::Blue,
        "cancelled" | "canceled" | "failed" | "refunded" => Badge::Red,
        _ => Badge::Grey,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub channel: &'static str,
    pub customer: String,
    pub email: String,
    pub phone: String,
    pub address_lines: Vec<String>,
    pub product: String,
    pub custom_image: Option<String>,
    pub total: String,
    pub placed_at: String,
    pub status: String,
    pub badge: Badge,
}

fn known(value: &str) -> Option<&str> {
    Some(value).filter(|v| *v != NOT_AVAILABLE)
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        let name = line_item_name(&order.product.name, known(&order.selected_color), known(&order.selected_size));
        let product = truncate(&format!("{} x {}", order.quantity, name), PRODUCT_LINE_WIDTH);
        let placed_at = Utc
            .timestamp_opt(order.created, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            id: order.id.clone(),
            channel: order.channel.as_str(),
            customer: order.customer.name.clone(),
            email: order.customer.email.clone(),
            phone: order.customer.phone.clone(),
            address_lines: wrap_text(&order.customer.address, ADDRESS_WIDTH),
            product,
            custom_image: order.product.custom_image.clone(),
            total: format_currency(order.amount_total),
            placed_at,
            status: order.status.as_str().to_string(),
            badge: status_badge(order.status.as_str()),
        }
    }
}
