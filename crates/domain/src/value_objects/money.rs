use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub const MAX_STORED_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinorUnitsError {
    /// Zero, negative, or rounds to zero.
    NotPositive,
    /// Larger than the store can persist.
    TooLarge,
}

/// Converts a major-unit amount into gateway minor units (two decimal places).
///
/// Rounds half away from zero before scaling, so `19.995` becomes `2000`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MinorUnitsError> {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded > MAX_STORED_AMOUNT {
        return Err(MinorUnitsError::TooLarge);
    }

    let minor = rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_i64())
        .ok_or(MinorUnitsError::TooLarge)?;
    if minor <= 0 {
        return Err(MinorUnitsError::NotPositive);
    }
    Ok(minor)
}
