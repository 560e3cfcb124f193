//! Invoice authoring client: totals, validation and the wire payload for a
//! REST invoicing backend, plus the form session that ties them together.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod form;
pub mod model;
pub mod numbering;
pub mod payload;
pub mod preview;
pub mod totals;
pub mod validate;

pub use api::{CreatedInvoice, HttpInvoiceService, InvoiceApi, SequenceReservation};
pub use auth::{AuthProvider, AuthSession, PasswordAuth, StaticToken, TokenSource};
pub use error::{ApiError, AuthError, ConfigError, Error, FormError, PayloadError, Result};
pub use filter::InvoiceFilter;
pub use form::{FormState, InvoiceForm};
pub use model::{
    BankInfo, InvoiceDraft, InvoiceStatus, InvoiceSummary, InvoiceTotals, LineItem, Party, PaymentMethod,
    TemplateType,
};
pub use payload::{ApiInvoiceDocument, to_api_payload};
pub use totals::compute_totals;
pub use validate::{ErrorMap, FieldKey, ItemField, validate};
