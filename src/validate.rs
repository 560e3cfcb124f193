//! Client-side validation of an [`InvoiceDraft`].

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{InvoiceDraft, TemplateType};
use crate::totals::parse_number;

const REQUIRED: &str = "This field is required";
const MUST_BE_POSITIVE: &str = "Must be > 0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

impl ItemField {
    fn as_str(self) -> &'static str {
        match self {
            ItemField::Description => "description",
            ItemField::Quantity => "quantity",
            ItemField::UnitPrice => "unitPrice",
        }
    }
}

/// Where an error belongs on the form.
///
/// Kept structured internally; `Display` produces the dotted path
/// (`billTo.companyName`, `items[2].quantity`) for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Template,
    DueDate,
    ValidUntil,
    PaymentTerms,
    PaymentMethod,
    IssuerCompanyName,
    ClientCompanyName,
    ItemsGeneral,
    Item { index: usize, field: ItemField },
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Template => f.write_str("template"),
            FieldKey::DueDate => f.write_str("dueDate"),
            FieldKey::ValidUntil => f.write_str("validUntil"),
            FieldKey::PaymentTerms => f.write_str("paymentTerms"),
            FieldKey::PaymentMethod => f.write_str("paymentMethods"),
            FieldKey::IssuerCompanyName => f.write_str("billFrom.companyName"),
            FieldKey::ClientCompanyName => f.write_str("billTo.companyName"),
            FieldKey::ItemsGeneral => f.write_str("itemsGeneral"),
            FieldKey::Item { index, field } => write!(f, "items[{}].{}", index, field.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMap(BTreeMap<FieldKey, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.0.insert(key, message.into());
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Errors keyed by their UI path.
    pub fn to_paths(&self) -> BTreeMap<String, String> {
        self.0.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }
}

pub fn validate(draft: &InvoiceDraft) -> ErrorMap {
    let mut errors = ErrorMap::new();

    match draft.template_type {
        TemplateType::None => errors.insert(FieldKey::Template, "Please select an invoice type"),
        TemplateType::Standard => {
            if draft.due_date.is_none() {
                errors.insert(FieldKey::DueDate, "Please select a due date");
            }
        }
        TemplateType::Proforma => {
            if draft.valid_until.is_none() {
                errors.insert(FieldKey::ValidUntil, "Please select a valid until date");
            }
        }
    }

    if draft.payment_terms.trim().is_empty() {
        errors.insert(FieldKey::PaymentTerms, REQUIRED);
    }
    if draft.payment_method.is_none() {
        errors.insert(FieldKey::PaymentMethod, "Please select a payment method");
    }

    // Address sub-fields are deliberately lenient: only the company names are required.
    if draft.issuer.company_name.trim().is_empty() {
        errors.insert(FieldKey::IssuerCompanyName, REQUIRED);
    }
    if draft.client.company_name.trim().is_empty() {
        errors.insert(FieldKey::ClientCompanyName, REQUIRED);
    }

    if draft.items.iter().all(|item| item.is_blank()) {
        errors.insert(FieldKey::ItemsGeneral, "Please add at least one valid item.");
        return errors;
    }

    for (index, item) in draft.items.iter().enumerate() {
        if !item.is_touched() {
            continue;
        }
        if item.description.trim().is_empty() {
            errors.insert(FieldKey::Item { index, field: ItemField::Description }, REQUIRED);
        }
        if parse_number(&item.quantity) <= 0.0 {
            errors.insert(FieldKey::Item { index, field: ItemField::Quantity }, MUST_BE_POSITIVE);
        }
        if parse_number(&item.unit_price) <= 0.0 {
            errors.insert(FieldKey::Item { index, field: ItemField::UnitPrice }, MUST_BE_POSITIVE);
        }
    }

    errors
}
