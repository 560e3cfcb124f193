//! Invoice form session: owns the draft, keeps totals and errors current,
//! and drives the save flow.
//!
//! Every mutating command recomputes derived state before returning, so
//! [`InvoiceForm::totals`] never lags behind the draft.

use chrono::{Days, Local, NaiveDate};

use crate::api::{CreatedInvoice, InvoiceApi};
use crate::error::{ApiError, FormError};
use crate::model::{InvoiceDraft, InvoiceTotals, LineItem, TemplateType};
use crate::numbering::derive_invoice_number;
use crate::payload::{ApiInvoiceDocument, to_api_payload};
use crate::totals::{compute_totals, sanitize_tax_input};
use crate::validate::{ErrorMap, ItemField, validate};

/// Days a proforma stays valid when the user has not picked a date.
const PROFORMA_VALIDITY_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// No template selected yet.
    Empty,
    Editing,
    Submitting,
    Saved { id: String },
}

#[derive(Debug, Clone)]
pub struct InvoiceForm {
    draft: InvoiceDraft,
    errors: ErrorMap,
    totals: InvoiceTotals,
    sequence: Option<u64>,
    state: FormState,
    today: NaiveDate,
}

impl InvoiceForm {
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    /// Form whose "now" is fixed to `today`.
    pub fn with_today(today: NaiveDate) -> Self {
        let draft = InvoiceDraft::new();
        let totals = compute_totals(&draft.items, &draft.tax_rate_percent, &draft.shipping_cost, &draft.discount_amount);
        Self {
            draft,
            errors: ErrorMap::new(),
            totals,
            sequence: None,
            state: FormState::Empty,
            today,
        }
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    pub fn is_saving(&self) -> bool {
        self.state == FormState::Submitting
    }

    /// Selects the template, reserving an invoice sequence the first time.
    ///
    /// A failed reservation keeps the template and every entered field; the
    /// invoice number stays unset and calling this again retries.
    pub fn select_template(&mut self, api: &dyn InvoiceApi, template: TemplateType) -> Result<(), ApiError> {
        self.draft.template_type = template;

        if !template.is_selected() {
            self.draft.invoice_number = None;
            if self.state == FormState::Editing {
                self.state = FormState::Empty;
            }
            return Ok(());
        }

        if self.state == FormState::Empty {
            self.state = FormState::Editing;
        }

        if self.sequence.is_none() {
            let reservation = api.reserve_sequence().inspect_err(|e| {
                tracing::warn!(error = %e, "could not reserve invoice sequence");
            })?;
            tracing::debug!(sequence = reservation.sequence, "reserved invoice sequence");
            self.sequence = Some(reservation.sequence);
        }

        self.draft.invoice_date.get_or_insert(self.today);
        if template == TemplateType::Proforma && self.draft.valid_until.is_none() {
            self.draft.valid_until = self.today.checked_add_days(Days::new(PROFORMA_VALIDITY_DAYS));
        }

        self.refresh();
        Ok(())
    }

    /// Applies an edit to the draft. Template and invoice number are owned by
    /// the form and survive whatever `edit` does to them.
    pub fn update(&mut self, edit: impl FnOnce(&mut InvoiceDraft)) {
        let template = self.draft.template_type;
        let number = self.draft.invoice_number.clone();
        edit(&mut self.draft);
        self.draft.template_type = template;
        self.draft.invoice_number = number;
        self.refresh();
    }

    pub fn add_item(&mut self) {
        self.update(|d| d.items.push(LineItem::default()));
    }

    pub fn remove_item(&mut self, index: usize) {
        self.update(|d| {
            if index < d.items.len() {
                d.items.remove(index);
            }
        });
    }

    pub fn set_item_field(&mut self, index: usize, field: ItemField, value: impl Into<String>) {
        let value = value.into();
        self.update(|d| {
            if let Some(item) = d.items.get_mut(index) {
                match field {
                    ItemField::Description => item.description = value,
                    ItemField::Quantity => item.quantity = value,
                    ItemField::UnitPrice => item.unit_price = value,
                }
            }
        });
    }

    pub fn set_tax_rate(&mut self, raw: &str) {
        let cleaned = sanitize_tax_input(raw);
        self.update(|d| d.tax_rate_percent = cleaned);
    }

    /// Validates the draft and, if it passes, moves to `Submitting` and
    /// returns the document to send.
    pub fn begin_submit(&mut self) -> Result<ApiInvoiceDocument, FormError> {
        match self.state {
            FormState::Submitting => return Err(FormError::SubmitInProgress),
            FormState::Saved { .. } => return Err(FormError::AlreadySaved),
            _ => {}
        }

        self.errors = validate(&self.draft);
        if !self.errors.is_valid() {
            tracing::debug!(errors = ?self.errors.to_paths(), "validation failed");
            return Err(FormError::Invalid(self.errors.clone()));
        }

        let payload = to_api_payload(&self.draft, self.draft.template_type)?;
        self.state = FormState::Submitting;
        Ok(payload)
    }

    /// Records the outcome of the create call started by [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, result: Result<CreatedInvoice, ApiError>) -> Result<CreatedInvoice, FormError> {
        match result {
            Ok(created) => {
                self.state = FormState::Saved { id: created.id.clone() };
                Ok(created)
            }
            Err(e) => {
                self.state = FormState::Editing;
                Err(FormError::Api(e))
            }
        }
    }

    pub fn submit(&mut self, api: &dyn InvoiceApi) -> Result<CreatedInvoice, FormError> {
        let payload = self.begin_submit()?;
        let result = api.create_invoice(&payload);
        self.finish_submit(result)
    }

    /// Throws the draft away and starts over.
    pub fn cancel(&mut self) {
        *self = Self::with_today(self.today);
    }

    fn refresh(&mut self) {
        let d = &self.draft;
        self.totals = compute_totals(&d.items, &d.tax_rate_percent, &d.shipping_cost, &d.discount_amount);

        if let Some(sequence) = self.sequence {
            let date = d.invoice_date.unwrap_or(self.today);
            if let Some(number) = derive_invoice_number(d.template_type, date, &d.client.city_state_zip, sequence) {
                self.draft.invoice_number = Some(number);
            }
        }
    }
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new()
    }
}
