use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::totals::parse_number;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateType {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "standard_invoice")]
    Standard,
    #[serde(rename = "proforma_invoice")]
    Proforma,
}

impl TemplateType {
    pub const OPTIONS: [TemplateType; 2] = [TemplateType::Standard, TemplateType::Proforma];

    /// Value the backend expects in `template_type`.
    pub fn api_value(self) -> Option<&'static str> {
        match self {
            TemplateType::Standard => Some("STANDARD"),
            TemplateType::Proforma => Some("PROFORMA"),
            TemplateType::None => None,
        }
    }

    /// Prefix used in derived invoice numbers.
    pub fn code(self) -> Option<&'static str> {
        match self {
            TemplateType::Standard => Some("STD"),
            TemplateType::Proforma => Some("PRF"),
            TemplateType::None => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateType::Standard => "Standard Invoice",
            TemplateType::Proforma => "Proforma Invoice",
            TemplateType::None => "Select Invoice Type...",
        }
    }

    pub fn is_selected(self) -> bool {
        self != TemplateType::None
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
    Paypal,
    Check,
    Stripe,
    Zelle,
    Venmo,
    Cash,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 9] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::CreditCard,
        PaymentMethod::Paypal,
        PaymentMethod::Check,
        PaymentMethod::Stripe,
        PaymentMethod::Zelle,
        PaymentMethod::Venmo,
        PaymentMethod::Cash,
        PaymentMethod::Other,
    ];

    /// Wire value, e.g. `bank_transfer`.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Check => "check",
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Zelle => "zelle",
            PaymentMethod::Venmo => "venmo",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank Transfer (ACH/Wire)",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Check => "Check",
            PaymentMethod::Stripe => "Stripe",
            PaymentMethod::Zelle => "Zelle",
            PaymentMethod::Venmo => "Venmo",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Other => "Other (Specify in Notes)",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Party {
    pub company_name: String,
    pub address: String,
    pub city_state_zip: String,
    pub phone: String,
    pub email: String,
}

/// A row of the items table. Numeric columns keep the text the user typed.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: impl Into<String>, unit_price: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
        }
    }

    pub fn line_total(&self) -> f64 {
        parse_number(&self.quantity) * parse_number(&self.unit_price)
    }

    /// A row counts as touched once any of its cells holds something.
    pub fn is_touched(&self) -> bool {
        !self.description.is_empty() || !self.quantity.is_empty() || !self.unit_price.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BankInfo {
    pub company_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub routing_number: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub template_type: TemplateType,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub shipping_method: String,
    pub issuer: Party,
    pub client: Party,
    pub items: Vec<LineItem>,
    pub tax_rate_percent: String,
    pub shipping_cost: String,
    pub discount_amount: String,
    pub payment_terms: String,
    pub payment_method: Option<PaymentMethod>,
    pub bank_info: BankInfo,
    pub notes: String,
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self {
            template_type: TemplateType::None,
            invoice_number: None,
            invoice_date: None,
            due_date: None,
            valid_until: None,
            estimated_delivery_date: None,
            shipping_method: String::new(),
            issuer: Party::default(),
            client: Party::default(),
            items: vec![LineItem::default()],
            tax_rate_percent: "0".into(),
            shipping_cost: "0".into(),
            discount_amount: "0".into(),
            payment_terms: String::new(),
            payment_method: None,
            bank_info: BankInfo::default(),
            notes: String::new(),
        }
    }

    pub fn notes_label(&self) -> &'static str {
        if self.template_type == TemplateType::Proforma {
            "Terms & Conditions"
        } else {
            "Notes"
        }
    }
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Default)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub shipping_cost: f64,
    pub discount_amount: f64,
    pub total_due: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Draft,
    Sent,
    Viewed,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 6] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Viewed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Viewed => "Viewed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the invoice list as returned by `GET /invoices`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceSummary {
    pub id: String,
    pub date_created: String,
    pub company_name: String,
    pub invoice_value: String,
    pub payment_method: String,
    pub payment_deadline: String,
    pub status: String,
}

impl InvoiceSummary {
    /// `invoice_value` arrives formatted ("1,500"); strip separators before parsing.
    pub fn amount(&self) -> f64 {
        let cleaned: String = self.invoice_value.chars().filter(|c| *c != ',' && *c != '$').collect();
        parse_number(&cleaned)
    }
}
