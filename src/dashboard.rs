//! Figures shown on the dashboard: status breakdown, monthly revenue,
//! headline counters and the outstanding payments table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{InvoiceStatus, InvoiceSummary};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatusCount {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cards {
    pub total_invoices_issued: u64,
    pub total_invoices_payment: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PendingPayment {
    pub id: String,
    pub amount: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub invoices_status: Vec<StatusCount>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub cards: Cards,
    pub pending_payments: Vec<PendingPayment>,
}

impl DashboardData {
    pub fn from_invoices(invoices: &[InvoiceSummary]) -> Self {
        let mut by_status: BTreeMap<&str, u64> = BTreeMap::new();
        // Key: (Year, Month)
        let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        let mut paid = 0;
        let mut pending_payments = Vec::new();

        for invoice in invoices {
            *by_status.entry(invoice.status.as_str()).or_insert(0) += 1;

            if let Ok(date) = NaiveDate::parse_from_str(&invoice.date_created, "%Y-%m-%d") {
                use chrono::Datelike;
                *by_month.entry((date.year(), date.month())).or_insert(0.0) += invoice.amount();
            }

            if InvoiceStatus::parse(&invoice.status) == Some(InvoiceStatus::Paid) {
                paid += 1;
            } else {
                pending_payments.push(PendingPayment {
                    id: invoice.id.clone(),
                    amount: invoice.invoice_value.clone(),
                    date: invoice.payment_deadline.clone(),
                    status: invoice.status.clone(),
                });
            }
        }

        let monthly_revenue = by_month
            .into_iter()
            .filter_map(|((year, month), revenue)| {
                let label = NaiveDate::from_ymd_opt(year, month, 1)?.format("%B %Y").to_string();
                Some(MonthlyRevenue { month: label, revenue })
            })
            .collect();

        DashboardData {
            invoices_status: by_status
                .into_iter()
                .map(|(label, value)| StatusCount { label: label.to_string(), value })
                .collect(),
            monthly_revenue,
            cards: Cards {
                total_invoices_issued: invoices.len() as u64,
                total_invoices_payment: paid,
            },
            pending_payments,
        }
    }
}
