use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::models::*;

/// Hospital-wide billing defaults
#[derive(Debug, Clone)]
pub struct BillingPolicy {
    /// Tax percentage applied when an invoice does not specify one
    pub default_tax_rate: Decimal,
    /// Days between issue and due date
    pub payment_terms_days: i64,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            default_tax_rate: Decimal::ZERO,
            payment_terms_days: 30,
        }
    }
}

/// Billing service
#[derive(Debug, Clone, Default)]
pub struct BillingService {
    policy: BillingPolicy,
}

impl BillingService {
    /// Create a new billing service
    pub fn new(policy: BillingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    /// Price an invoice.
    ///
    /// `total = max(0, subtotal + subtotal * tax_rate / 100 - discount - insurance_coverage)`,
    /// each stage rounded to cents.
    pub fn compute_totals(&self, input: &InvoiceInput) -> BillingResult<InvoiceTotals> {
        validate_input(input)?;

        let subtotal = round_money(input.items.iter().map(LineItem::amount).sum());
        let tax_amount = round_money(subtotal * input.tax_rate / Decimal::ONE_HUNDRED);
        let gross = subtotal + tax_amount - input.discount - input.insurance_coverage;
        let total = round_money(gross.max(Decimal::ZERO));

        tracing::debug!(
            items = input.items.len(),
            %subtotal,
            %tax_amount,
            %total,
            "Invoice priced"
        );

        Ok(InvoiceTotals {
            subtotal,
            tax_amount,
            total,
        })
    }

    /// Tax rate to use when the request leaves it out
    pub fn tax_rate_or_default(&self, requested: Option<Decimal>) -> Decimal {
        requested.unwrap_or(self.policy.default_tax_rate)
    }

    /// Status of a freshly issued invoice
    pub fn initial_status(&self, totals: &InvoiceTotals) -> PaymentStatus {
        if totals.total.is_zero() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        }
    }

    pub fn due_date(&self, issued: NaiveDate) -> NaiveDate {
        issued + Duration::days(self.policy.payment_terms_days)
    }

    /// `INV-<YYYYMM>-<6 hex>`
    pub fn invoice_number(&self, issued_at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "INV-{:04}{:02}-{}",
            issued_at.year(),
            issued_at.month(),
            suffix.get(..6).unwrap_or(&suffix).to_uppercase()
        )
    }
}

fn validate_input(input: &InvoiceInput) -> BillingResult<()> {
    if input.items.is_empty() {
        return Err(BillingError::Validation("Invoice must contain at least one line item".to_string()));
    }

    for (index, item) in input.items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(BillingError::Validation(format!("Line item {} is missing a description", index + 1)));
        }
        if item.quantity <= Decimal::ZERO {
            return Err(BillingError::Validation(format!("Line item {} must have a positive quantity", index + 1)));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(BillingError::Validation(format!("Line item {} has a negative unit price", index + 1)));
        }
    }

    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE_HUNDRED {
        return Err(BillingError::Validation("Tax rate must be between 0 and 100 percent".to_string()));
    }
    if input.discount < Decimal::ZERO {
        return Err(BillingError::Validation("Discount cannot be negative".to_string()));
    }
    if input.insurance_coverage < Decimal::ZERO {
        return Err(BillingError::Validation("Insurance coverage cannot be negative".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn input(items: Vec<LineItem>, tax_rate: Decimal, discount: Decimal, insurance: Decimal) -> InvoiceInput {
        InvoiceInput {
            items,
            tax_rate,
            discount,
            insurance_coverage: insurance,
        }
    }

    #[test]
    fn test_totals_with_tax_discount_and_insurance() {
        let service = BillingService::default();
        let totals = service
            .compute_totals(&input(
                vec![
                    LineItem::new("Consultation", dec!(1), dec!(150.00)),
                    LineItem::new("Blood panel", dec!(2), dec!(45.25)),
                ],
                dec!(10),
                dec!(20.00),
                dec!(100.00),
            ))
            .unwrap();

        assert_eq!(totals.subtotal, dec!(240.50));
        assert_eq!(totals.tax_amount, dec!(24.05));
        assert_eq!(totals.total, dec!(144.55));
    }

    #[test]
    fn test_total_floors_at_zero() {
        let service = BillingService::default();
        let totals = service
            .compute_totals(&input(
                vec![LineItem::new("Dressing change", dec!(1), dec!(30))],
                dec!(0),
                dec!(10),
                dec!(500),
            ))
            .unwrap();

        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(service.initial_status(&totals), PaymentStatus::Paid);
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let service = BillingService::default();
        let totals = service
            .compute_totals(&input(vec![LineItem::new("Saline", dec!(3), dec!(3.33))], dec!(7.5), dec!(0), dec!(0)))
            .unwrap();
        // 9.99 * 7.5% = 0.74925
        assert_eq!(totals.tax_amount, dec!(0.75));
        assert_eq!(totals.total, dec!(10.74));
    }

    #[test]
    fn test_rejects_empty_invoice() {
        let err = BillingService::default()
            .compute_totals(&input(vec![], dec!(0), dec!(0), dec!(0)))
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_scalars() {
        let service = BillingService::default();
        let items = vec![LineItem::new("Consultation", dec!(1), dec!(100))];
        assert!(service.compute_totals(&input(items.clone(), dec!(101), dec!(0), dec!(0))).is_err());
        assert!(service.compute_totals(&input(items.clone(), dec!(0), dec!(-1), dec!(0))).is_err());
        assert!(service.compute_totals(&input(items, dec!(0), dec!(0), dec!(-5))).is_err());
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = BillingService::default()
            .compute_totals(&input(vec![LineItem::new("X-ray", dec!(0), dec!(80))], dec!(0), dec!(0), dec!(0)))
            .unwrap_err();
        assert_eq!(err, BillingError::Validation("Line item 1 must have a positive quantity".to_string()));
    }

    #[test]
    fn test_due_date_and_invoice_number() {
        let service = BillingService::new(BillingPolicy {
            default_tax_rate: dec!(5),
            payment_terms_days: 14,
        });
        let issued = NaiveDate::from_ymd_opt(2026, 3, 25).unwrap();
        assert_eq!(service.due_date(issued), NaiveDate::from_ymd_opt(2026, 4, 8).unwrap());
        assert_eq!(service.tax_rate_or_default(None), dec!(5));
        assert_eq!(service.tax_rate_or_default(Some(dec!(8))), dec!(8));

        let issued_at = issued.and_hms_opt(9, 0, 0).unwrap().and_utc();
        let number = service.invoice_number(issued_at);
        assert!(number.starts_with("INV-202603-"));
        assert_eq!(number.len(), "INV-202603-".len() + 6);
    }

    fn money() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn prop_total_never_negative(
            prices in proptest::collection::vec(money(), 1..8),
            tax in 0i64..=100,
            discount in money(),
            insurance in money(),
        ) {
            let items = prices.into_iter().map(|p| LineItem::new("svc", Decimal::ONE, p)).collect();
            let totals = BillingService::default()
                .compute_totals(&input(items, Decimal::from(tax), discount, insurance))
                .unwrap();
            prop_assert!(totals.total >= Decimal::ZERO);
            prop_assert!(totals.total <= totals.subtotal + totals.tax_amount);
        }

        #[test]
        fn prop_larger_discount_never_raises_total(
            price in money(),
            discount in money(),
            extra in money(),
        ) {
            let service = BillingService::default();
            let items = vec![LineItem::new("svc", Decimal::ONE, price)];
            let low = service.compute_totals(&input(items.clone(), Decimal::ZERO, discount, Decimal::ZERO)).unwrap();
            let high = service.compute_totals(&input(items, Decimal::ZERO, discount + extra, Decimal::ZERO)).unwrap();
            prop_assert!(high.total <= low.total);
        }
    }
}
