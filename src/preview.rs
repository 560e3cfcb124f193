//! Plain-text rendering of an invoice draft, as shown before saving.

use serde::Serialize;
use tera::{Context, Tera};

use crate::model::{InvoiceDraft, InvoiceTotals, Party, PaymentMethod, TemplateType};

// Embed template at compile time to ensure availability
const PREVIEW_TEMPLATE: &str = include_str!("../templates/preview.txt.tera");

/// Formats an amount as US dollars, e.g. `$1,234.56`.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[derive(Serialize)]
struct PartyContext<'a> {
    company_name: &'a str,
    address: &'a str,
    city_state_zip: &'a str,
    phone: &'a str,
    email: &'a str,
}

impl<'a> From<&'a Party> for PartyContext<'a> {
    fn from(p: &'a Party) -> Self {
        Self {
            company_name: &p.company_name,
            address: &p.address,
            city_state_zip: &p.city_state_zip,
            phone: &p.phone,
            email: &p.email,
        }
    }
}

#[derive(Serialize)]
struct ItemContext<'a> {
    description: &'a str,
    quantity: &'a str,
    unit_price: String,
    line_total: String,
}

#[derive(Serialize)]
struct PreviewContext<'a> {
    title: &'static str,
    number_label: &'static str,
    number: &'a str,
    invoice_date: String,
    due_date: String,
    valid_until: String,
    is_proforma: bool,
    estimated_delivery_date: String,
    shipping_method: &'a str,
    issuer: PartyContext<'a>,
    client: PartyContext<'a>,
    items: Vec<ItemContext<'a>>,
    tax_rate: &'a str,
    subtotal: String,
    tax_amount: String,
    shipping: String,
    discount: String,
    total_due: String,
    payment_terms: &'a str,
    payment_method: &'static str,
    show_bank: bool,
    bank_company: &'a str,
    bank_name: &'a str,
    account_number: &'a str,
    routing_number: &'a str,
    notes_label: &'static str,
    notes: &'a str,
}

fn date_str(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default()
}

pub fn render_preview(draft: &InvoiceDraft, totals: &InvoiceTotals) -> Result<String, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template("preview.txt", PREVIEW_TEMPLATE)?;

    let is_proforma = draft.template_type == TemplateType::Proforma;
    let bank = &draft.bank_info;
    let context_data = PreviewContext {
        title: if is_proforma { "PROFORMA INVOICE" } else { "INVOICE" },
        number_label: if is_proforma { "Proforma Invoice Number" } else { "Invoice Number" },
        number: draft.invoice_number.as_deref().unwrap_or("(pending)"),
        invoice_date: date_str(draft.invoice_date),
        due_date: date_str(draft.due_date),
        valid_until: date_str(draft.valid_until),
        is_proforma,
        estimated_delivery_date: date_str(draft.estimated_delivery_date),
        shipping_method: &draft.shipping_method,
        issuer: PartyContext::from(&draft.issuer),
        client: PartyContext::from(&draft.client),
        items: draft
            .items
            .iter()
            .filter(|i| !i.is_blank())
            .map(|i| ItemContext {
                description: &i.description,
                quantity: &i.quantity,
                unit_price: format_currency(crate::totals::parse_number(&i.unit_price)),
                line_total: format_currency(i.line_total()),
            })
            .collect(),
        tax_rate: if draft.tax_rate_percent.is_empty() { "0" } else { &draft.tax_rate_percent },
        subtotal: format_currency(totals.subtotal),
        tax_amount: format_currency(totals.tax_amount),
        shipping: format_currency(totals.shipping_cost),
        discount: format_currency(totals.discount_amount),
        total_due: format_currency(totals.total_due),
        payment_terms: &draft.payment_terms,
        payment_method: draft.payment_method.map(PaymentMethod::label).unwrap_or("N/A"),
        show_bank: draft.payment_method == Some(PaymentMethod::BankTransfer),
        bank_company: &bank.company_name,
        bank_name: &bank.bank_name,
        account_number: &bank.account_number,
        routing_number: &bank.routing_number,
        notes_label: draft.notes_label(),
        notes: &draft.notes,
    };

    let context = Context::from_serialize(&context_data)?;
    tera.render("preview.txt", &context)
}
