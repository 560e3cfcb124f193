use crate::model::InvoiceSummary;

/// Filters for the invoice list. Empty fields match everything; set fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    pub search: String,
    pub status: String,
    pub date: String,
    pub payment_method: String,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &InvoiceSummary) -> bool {
        let company_match = invoice
            .company_name
            .to_lowercase()
            .contains(&self.search.to_lowercase());
        let status_match = self.status.is_empty() || invoice.status == self.status;
        let date_match = self.date.is_empty() || invoice.date_created == self.date;
        let method_match = self.payment_method.is_empty() || invoice.payment_method == self.payment_method;
        company_match && status_match && date_match && method_match
    }

    pub fn apply<'a>(&self, invoices: &'a [InvoiceSummary]) -> Vec<&'a InvoiceSummary> {
        invoices.iter().filter(|i| self.matches(i)).collect()
    }
}
