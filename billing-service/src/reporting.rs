use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::{round_money, PaymentStatus};

/// Invoice fields consumed by the financial dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSnapshot {
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub discount: Decimal,
    pub insurance_coverage: Decimal,
    /// Effective status (overdue already derived)
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusBreakdown {
    pub count: u64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub billed: Decimal,
    pub collected: Decimal,
}

/// Financial dashboard figures for a reporting window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FinancialSummary {
    pub invoice_count: u64,
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub outstanding: Decimal,
    pub insurance_covered: Decimal,
    pub discounts_given: Decimal,
    pub average_invoice: Decimal,
    /// Keyed by kebab-case status
    pub by_status: BTreeMap<String, StatusBreakdown>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

impl FinancialSummary {
    /// Aggregate a set of invoices. Cancelled invoices are counted per status but
    /// contribute nothing to billed, collected or outstanding amounts.
    pub fn from_invoices(invoices: &[InvoiceSnapshot]) -> Self {
        let mut summary = FinancialSummary::default();
        let mut months: BTreeMap<String, MonthlyRevenue> = BTreeMap::new();
        let mut billable: u64 = 0;

        for invoice in invoices {
            summary.invoice_count += 1;

            let entry = summary.by_status.entry(invoice.status.as_str().to_string()).or_default();
            entry.count += 1;
            entry.amount += invoice.total;

            if invoice.status == PaymentStatus::Cancelled {
                continue;
            }
            billable += 1;

            summary.total_billed += invoice.total;
            summary.total_collected += invoice.amount_paid;
            summary.outstanding += (invoice.total - invoice.amount_paid).max(Decimal::ZERO);
            summary.insurance_covered += invoice.insurance_coverage;
            summary.discounts_given += invoice.discount;

            let key = format!("{:04}-{:02}", invoice.created_at.year(), invoice.created_at.month());
            let month = months.entry(key.clone()).or_insert_with(|| MonthlyRevenue {
                month: key,
                ..MonthlyRevenue::default()
            });
            month.billed += invoice.total;
            month.collected += invoice.amount_paid;
        }

        if billable > 0 {
            summary.average_invoice = round_money(summary.total_billed / Decimal::from(billable));
        }
        summary.monthly_revenue = months.into_values().collect();

        tracing::debug!(
            invoices = summary.invoice_count,
            billed = %summary.total_billed,
            "Financial summary computed"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn snapshot(total: Decimal, paid: Decimal, status: PaymentStatus, month: u32) -> InvoiceSnapshot {
        InvoiceSnapshot {
            total,
            amount_paid: paid,
            discount: dec!(5),
            insurance_coverage: dec!(10),
            status,
            created_at: Utc.with_ymd_and_hms(2026, month, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = FinancialSummary::from_invoices(&[]);
        assert_eq!(summary.invoice_count, 0);
        assert_eq!(summary.average_invoice, Decimal::ZERO);
        assert!(summary.monthly_revenue.is_empty());
    }

    #[test]
    fn test_summary_totals_and_months() {
        let invoices = vec![
            snapshot(dec!(100), dec!(100), PaymentStatus::Paid, 1),
            snapshot(dec!(200), dec!(50), PaymentStatus::PartiallyPaid, 1),
            snapshot(dec!(50), dec!(0), PaymentStatus::Overdue, 2),
            snapshot(dec!(999), dec!(0), PaymentStatus::Cancelled, 2),
        ];
        let summary = FinancialSummary::from_invoices(&invoices);

        assert_eq!(summary.invoice_count, 4);
        assert_eq!(summary.total_billed, dec!(350));
        assert_eq!(summary.total_collected, dec!(150));
        assert_eq!(summary.outstanding, dec!(200));
        assert_eq!(summary.insurance_covered, dec!(30));
        assert_eq!(summary.discounts_given, dec!(15));
        assert_eq!(summary.average_invoice, dec!(116.67));

        assert_eq!(summary.by_status["cancelled"].count, 1);
        assert_eq!(summary.by_status["overdue"].amount, dec!(50));

        assert_eq!(summary.monthly_revenue.len(), 2);
        assert_eq!(summary.monthly_revenue[0].month, "2026-01");
        assert_eq!(summary.monthly_revenue[0].billed, dec!(300));
        assert_eq!(summary.monthly_revenue[1].collected, dec!(0));
    }
}
