//! Reference-currency pricing through an external price feed, and the
//! minimum-fee floor built on it.
//!
//! The feed is never cached and has no fallback: if it cannot answer,
//! registration and fee changes fail while existing entitlements and
//! withdrawals carry on.

use crate::admin::get_config;
use crate::rate::reference_value;
use crate::types::{Error, MIN_FEE_REFERENCE, ORACLE_MAX_AGE};
use soroban_sdk::{contractclient, contracttype, Address, Env, Symbol};

/// Asset identifier understood by SEP-40 price feeds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Asset {
    Stellar(Address),
    Other(Symbol),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceData {
    pub price: i128,
    pub timestamp: u64,
}

#[contractclient(name = "PriceFeedClient")]
pub trait PriceFeed {
    /// Most recent quote for `asset`, if any.
    fn lastprice(env: Env, asset: Asset) -> Option<PriceData>;
    /// Number of decimals in quoted prices.
    fn decimals(env: Env) -> u32;
}

/// Latest usable quote, as `(price, decimals)`.
fn latest_quote(env: &Env) -> Result<(i128, u32), Error> {
    let config = get_config(env)?;
    let feed = PriceFeedClient::new(env, &config.oracle);

    let quote = match feed.try_lastprice(&config.oracle_asset) {
        Ok(Ok(Some(quote))) => quote,
        _ => return Err(Error::OracleUnavailable),
    };
    let decimals = match feed.try_decimals() {
        Ok(Ok(decimals)) => decimals,
        _ => return Err(Error::OracleUnavailable),
    };

    if env.ledger().timestamp().saturating_sub(quote.timestamp) > ORACLE_MAX_AGE {
        return Err(Error::StalePrice);
    }
    if quote.price <= 0 {
        return Err(Error::InvalidPrice);
    }
    Ok((quote.price, decimals))
}

/// Reference-currency value of `amount` token units.
pub fn price_of(env: &Env, amount: i128) -> Result<i128, Error> {
    let (price, decimals) = latest_quote(env)?;
    reference_value(amount, price, decimals)
}

/// Fails with [`Error::FeeTooLow`] when `monthly_fee` is worth less than
/// [`MIN_FEE_REFERENCE`].
pub fn enforce_minimum(env: &Env, monthly_fee: i128) -> Result<(), Error> {
    if price_of(env, monthly_fee)? < MIN_FEE_REFERENCE {
        return Err(Error::FeeTooLow);
    }
    Ok(())
}
