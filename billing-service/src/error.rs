use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid invoice state: {0}")]
    InvalidState(String),

    #[error("Payment of {attempted} exceeds the outstanding balance of {balance}")]
    Overpayment { balance: Decimal, attempted: Decimal },
}

pub type BillingResult<T> = Result<T, BillingError>;
