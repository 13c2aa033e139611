use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

const SCALE: u32 = 2;

/// Largest accepted magnitude, in cents (one billion currency units).
///
/// Keeps the per-category monthly `SUM` of `amount_cents` inside `i64` for
/// any row count SQLite can hold in practice.
pub const MAX_CENTS: i64 = 100_000_000_000;

/// Amount in the single fixed currency, two fractional digits.
///
/// Persisted as integer cents so SQL sums stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, SCALE))
    }

    /// Fails on sub-cent precision or when the magnitude exceeds [`MAX_CENTS`].
    pub fn to_cents(self) -> LedgerResult<i64> {
        if self.0.normalize().scale() > SCALE {
            return Err(LedgerError::invalid(format!(
                "amount {} has more than {SCALE} decimal places",
                self.0
            )));
        }
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .filter(|cents| cents.unsigned_abs() <= MAX_CENTS.unsigned_abs())
            .ok_or_else(|| {
                LedgerError::invalid(format!(
                    "amount {} exceeds the maximum of {}",
                    self.0,
                    Money::from_cents(MAX_CENTS)
                ))
            })
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.round_dp(SCALE))
    }
}
