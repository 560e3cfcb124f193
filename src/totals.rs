//! Derived invoice totals.
//!
//! Everything here is pure and cheap enough to run after every edit.

use crate::model::{InvoiceTotals, LineItem};

/// Parses the numeric prefix of `raw` the way a browser's `parseFloat` does.
///
/// Leading whitespace is skipped and the longest valid prefix is used, so
/// `"10abc"` is 10. Anything without a numeric prefix, or a non-finite
/// result, is 0.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    // Optional exponent, only taken when it has digits.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn compute_totals(
    items: &[LineItem],
    tax_rate_percent: &str,
    shipping_cost: &str,
    discount_amount: &str,
) -> InvoiceTotals {
    let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
    let tax_rate = parse_number(tax_rate_percent);
    let tax_amount = subtotal * (tax_rate / 100.0);
    let shipping_cost = parse_number(shipping_cost);
    let discount_amount = parse_number(discount_amount);

    InvoiceTotals {
        subtotal,
        tax_amount,
        shipping_cost,
        discount_amount,
        total_due: subtotal + tax_amount + shipping_cost - discount_amount,
    }
}

/// Cleans a tax-rate keystroke: digits and one '.' only, two decimals at most.
pub fn sanitize_tax_input(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let mut parts = cleaned.split('.');
    let whole = parts.next().unwrap_or_default();
    match parts.next() {
        Some(frac) => {
            let frac: String = frac.chars().take(2).collect();
            format!("{whole}.{frac}")
        }
        None => whole.to_string(),
    }
}
