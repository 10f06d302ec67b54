//! Env-free fee and time arithmetic shared by the registries.

use crate::types::{Error, SECONDS_PER_MONTH};

/// Per-second rate for a monthly fee. Truncates: a fee below
/// [`SECONDS_PER_MONTH`] yields a zero rate.
pub fn fee_per_second(monthly_fee: i128) -> i128 {
    monthly_fee / SECONDS_PER_MONTH as i128
}

/// Whole seconds of entitlement bought by `amount` at `fee_per_second`.
/// Fractional seconds are forfeited.
pub fn purchased_seconds(amount: i128, fee_per_second: i128) -> Result<u64, Error> {
    if fee_per_second <= 0 {
        return Err(Error::ZeroFeeRate);
    }
    let seconds = amount.checked_div(fee_per_second).ok_or(Error::Overflow)?;
    u64::try_from(seconds).map_err(|_| Error::Overflow)
}

/// Unspent value of an entitlement expiring at `due_date`. Zero once
/// `now >= due_date`.
pub fn remaining_value(due_date: u64, now: u64, fee_per_second: i128) -> Result<i128, Error> {
    if due_date <= now {
        return Ok(0);
    }
    i128::from(due_date - now)
        .checked_mul(fee_per_second)
        .ok_or(Error::Overflow)
}

/// `amount * price / 10^decimals`.
pub fn reference_value(amount: i128, price: i128, decimals: u32) -> Result<i128, Error> {
    let scale = 10i128.checked_pow(decimals).ok_or(Error::Overflow)?;
    amount
        .checked_mul(price)
        .ok_or(Error::Overflow)?
        .checked_div(scale)
        .ok_or(Error::Overflow)
}
