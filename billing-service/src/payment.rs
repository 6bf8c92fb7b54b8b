use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{BillingError, BillingResult};
use crate::models::{round_money, PaymentStatus};

/// Payment-relevant view of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceBalance {
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub status: PaymentStatus,
}

/// Result of applying a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub amount_paid: Decimal,
    pub status: PaymentStatus,
    /// True when this payment settled the invoice
    pub settled: bool,
}

impl InvoiceBalance {
    pub fn outstanding(&self) -> Decimal {
        if self.status == PaymentStatus::Cancelled {
            return Decimal::ZERO;
        }
        (self.total - self.amount_paid).max(Decimal::ZERO)
    }

    /// Apply a payment and derive the new status
    ///
    /// The amount is rounded to cents first; anything that rounds to zero is rejected.
    pub fn apply_payment(&self, amount: Decimal) -> BillingResult<PaymentOutcome> {
        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(BillingError::Validation("Payment amount must be positive".to_string()));
        }
        match self.status {
            PaymentStatus::Cancelled => {
                return Err(BillingError::InvalidState("Cannot record a payment on a cancelled invoice".to_string()));
            }
            PaymentStatus::Paid => {
                return Err(BillingError::InvalidState("Invoice is already paid in full".to_string()));
            }
            _ => {}
        }

        let balance = self.outstanding();
        if amount > balance {
            return Err(BillingError::Overpayment {
                balance,
                attempted: amount,
            });
        }

        let amount_paid = self.amount_paid + amount;
        let settled = amount_paid >= self.total;
        let status = if settled {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        };

        Ok(PaymentOutcome {
            amount_paid,
            status,
            settled,
        })
    }

    pub fn ensure_cancellable(&self) -> BillingResult<()> {
        if self.status == PaymentStatus::Cancelled {
            return Err(BillingError::InvalidState("Invoice is already cancelled".to_string()));
        }
        if self.amount_paid > Decimal::ZERO {
            return Err(BillingError::InvalidState(
                "Cannot cancel an invoice with recorded payments".to_string(),
            ));
        }
        Ok(())
    }

    /// Line items and amounts may only change before any money is received
    pub fn ensure_editable(&self) -> BillingResult<()> {
        if self.status == PaymentStatus::Cancelled {
            return Err(BillingError::InvalidState("Cannot edit a cancelled invoice".to_string()));
        }
        if self.amount_paid > Decimal::ZERO {
            return Err(BillingError::InvalidState(
                "Cannot edit an invoice once a payment has been recorded".to_string(),
            ));
        }
        Ok(())
    }
}

/// Status as reported to callers: unpaid invoices past their due date read as overdue
pub fn effective_status(status: PaymentStatus, due_date: Option<NaiveDate>, today: NaiveDate) -> PaymentStatus {
    match (status, due_date) {
        (PaymentStatus::Pending | PaymentStatus::PartiallyPaid, Some(due)) if due < today => PaymentStatus::Overdue,
        _ => status,
    }
}

/// Status after re-pricing an unpaid invoice
pub fn status_after_repricing(total: Decimal) -> PaymentStatus {
    if total.is_zero() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(total: Decimal, paid: Decimal, status: PaymentStatus) -> InvoiceBalance {
        InvoiceBalance {
            total,
            amount_paid: paid,
            status,
        }
    }

    #[test]
    fn test_partial_then_full_payment() {
        let inv = invoice(dec!(200.00), dec!(0), PaymentStatus::Pending);
        let first = inv.apply_payment(dec!(50)).unwrap();
        assert_eq!(first.status, PaymentStatus::PartiallyPaid);
        assert_eq!(first.amount_paid, dec!(50));
        assert!(!first.settled);

        let inv = invoice(dec!(200.00), first.amount_paid, first.status);
        let second = inv.apply_payment(dec!(150)).unwrap();
        assert_eq!(second.status, PaymentStatus::Paid);
        assert!(second.settled);
    }

    #[test]
    fn test_overdue_invoice_accepts_payment() {
        let inv = invoice(dec!(80), dec!(0), PaymentStatus::Overdue);
        assert_eq!(inv.apply_payment(dec!(80)).unwrap().status, PaymentStatus::Paid);
    }

    #[test]
    fn test_rejects_payment_on_closed_invoices() {
        let cancelled = invoice(dec!(100), dec!(0), PaymentStatus::Cancelled);
        assert!(matches!(cancelled.apply_payment(dec!(10)), Err(BillingError::InvalidState(_))));

        let paid = invoice(dec!(100), dec!(100), PaymentStatus::Paid);
        assert!(matches!(paid.apply_payment(dec!(10)), Err(BillingError::InvalidState(_))));
    }

    #[test]
    fn test_rejects_non_positive_and_overpayment() {
        let inv = invoice(dec!(100), dec!(40), PaymentStatus::PartiallyPaid);
        assert!(matches!(inv.apply_payment(dec!(0)), Err(BillingError::Validation(_))));
        assert_eq!(
            inv.apply_payment(dec!(60.01)),
            Err(BillingError::Overpayment {
                balance: dec!(60),
                attempted: dec!(60.01),
            })
        );
    }

    #[test]
    fn test_sub_cent_payment_rejected() {
        let inv = invoice(dec!(100), dec!(0), PaymentStatus::Pending);
        assert!(matches!(inv.apply_payment(dec!(0.001)), Err(BillingError::Validation(_))));
        assert!(matches!(inv.apply_payment(dec!(0.004)), Err(BillingError::Validation(_))));

        let rounded_up = inv.apply_payment(dec!(0.005)).unwrap();
        assert_eq!(rounded_up.amount_paid, dec!(0.01));
        assert_eq!(rounded_up.status, PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn test_cancel_and_edit_only_without_payments() {
        let fresh = invoice(dec!(100), dec!(0), PaymentStatus::Pending);
        assert!(fresh.ensure_cancellable().is_ok());
        assert!(fresh.ensure_editable().is_ok());

        let touched = invoice(dec!(100), dec!(1), PaymentStatus::PartiallyPaid);
        assert!(touched.ensure_cancellable().is_err());
        assert!(touched.ensure_editable().is_err());

        let cancelled = invoice(dec!(100), dec!(0), PaymentStatus::Cancelled);
        assert!(cancelled.ensure_cancellable().is_err());
        assert_eq!(cancelled.outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_effective_status_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 5, 9).unwrap();

        assert_eq!(effective_status(PaymentStatus::Pending, Some(yesterday), today), PaymentStatus::Overdue);
        assert_eq!(effective_status(PaymentStatus::PartiallyPaid, Some(yesterday), today), PaymentStatus::Overdue);
        assert_eq!(effective_status(PaymentStatus::Pending, Some(today), today), PaymentStatus::Pending);
        assert_eq!(effective_status(PaymentStatus::Paid, Some(yesterday), today), PaymentStatus::Paid);
        assert_eq!(effective_status(PaymentStatus::Pending, None, today), PaymentStatus::Pending);
    }

    #[test]
    fn test_status_after_repricing() {
        assert_eq!(status_after_repricing(Decimal::ZERO), PaymentStatus::Paid);
        assert_eq!(status_after_repricing(dec!(0.01)), PaymentStatus::Pending);
    }
}
