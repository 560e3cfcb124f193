use chrono::{Datelike, NaiveDate};

use crate::model::TemplateType;

/// Builds the human-readable invoice number from a reserved sequence.
///
/// Format: `{STD|PRF}-{city code}-{MM}-{YYYY}-{sequence:08}`. The city code is
/// the first two characters of the client's city line, upper-cased, or `XX`.
pub fn derive_invoice_number(
    template: TemplateType,
    date: NaiveDate,
    client_city: &str,
    sequence: u64,
) -> Option<String> {
    let code = template.code()?;
    let city = client_city.trim();
    let city_code = if city.is_empty() {
        "XX".to_string()
    } else {
        city.chars().take(2).collect::<String>().to_uppercase()
    };
    Some(format!(
        "{}-{}-{:02}-{}-{:08}",
        code,
        city_code,
        date.month(),
        date.year(),
        sequence
    ))
}
