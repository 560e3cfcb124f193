//! Translation of the form's draft into the backend's invoice document.
//!
//! Nothing else in the crate builds the wire shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::model::{InvoiceDraft, Party, TemplateType};
use crate::totals::parse_number;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiParty {
    pub company_name: String,
    pub address: String,
    pub city_state_zip: String,
    pub phone_number: String,
    pub email: String,
}

impl From<&Party> for ApiParty {
    fn from(p: &Party) -> Self {
        Self {
            company_name: p.company_name.clone(),
            address: p.address.clone(),
            city_state_zip: p.city_state_zip.clone(),
            phone_number: p.phone.clone(),
            email: p.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentInfo {
    pub bank_name: String,
    pub account_number: String,
    pub routing_number: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShippingInfo {
    pub estimated_delivery_date: Option<String>,
    pub shipping_method: String,
    pub shipping_address: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SpecificData {
    Standard {
        due_date: Option<String>,
        payment_terms: String,
        notes: String,
        payment_info: PaymentInfo,
    },
    Proforma {
        valid_until: Option<String>,
        payment_terms: String,
        additional_terms: String,
        shipping_info: ShippingInfo,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiInvoiceDocument {
    pub id: Option<String>,
    pub template_type: String,
    pub issue_date: Option<String>,
    pub issuer: ApiParty,
    pub client: ApiParty,
    pub items: Vec<ApiLineItem>,
    pub tax_percentage: f64,
    pub shipping: f64,
    pub discount: f64,
    pub payment_methods: Option<String>,
    pub specific_data: SpecificData,
}

fn iso_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn to_api_payload(
    draft: &InvoiceDraft,
    template_type: TemplateType,
) -> Result<ApiInvoiceDocument, PayloadError> {
    let api_template = template_type
        .api_value()
        .ok_or(PayloadError::UnknownTemplate(template_type))?;

    let items = draft
        .items
        .iter()
        .filter(|item| !item.is_blank())
        .map(|item| ApiLineItem {
            description: item.description.clone(),
            quantity: parse_number(&item.quantity),
            unit_price: parse_number(&item.unit_price),
        })
        .collect();

    let specific_data = match template_type {
        TemplateType::Proforma => SpecificData::Proforma {
            valid_until: iso_date(draft.valid_until),
            payment_terms: draft.payment_terms.clone(),
            additional_terms: draft.notes.clone(),
            shipping_info: ShippingInfo {
                estimated_delivery_date: iso_date(draft.estimated_delivery_date),
                shipping_method: draft.shipping_method.clone(),
                // Not collected by the form; the backend requires the key.
                shipping_address: String::new(),
            },
        },
        _ => SpecificData::Standard {
            due_date: iso_date(draft.due_date),
            payment_terms: draft.payment_terms.clone(),
            notes: draft.notes.clone(),
            payment_info: PaymentInfo {
                bank_name: draft.bank_info.bank_name.clone(),
                account_number: draft.bank_info.account_number.clone(),
                routing_number: draft.bank_info.routing_number.clone(),
            },
        },
    };

    Ok(ApiInvoiceDocument {
        id: draft.invoice_number.clone(),
        template_type: api_template.to_string(),
        issue_date: iso_date(draft.invoice_date),
        issuer: ApiParty::from(&draft.issuer),
        client: ApiParty::from(&draft.client),
        items,
        tax_percentage: parse_number(&draft.tax_rate_percent),
        shipping: parse_number(&draft.shipping_cost),
        discount: parse_number(&draft.discount_amount),
        payment_methods: draft.payment_method.map(|m| m.as_str().to_string()),
        specific_data,
    })
}
