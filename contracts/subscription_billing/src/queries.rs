//! Read-only views: provider and subscriber state, derived balances.

use crate::oracle::price_of;
use crate::types::{Error, Provider, Subscriber};
use crate::{provider, subscriber};
use soroban_sdk::Env;

pub fn get_provider(env: &Env, provider_id: u64) -> Result<Provider, Error> {
    provider::load(env, provider_id)
}

pub fn get_provider_earnings(env: &Env, provider_id: u64) -> Result<i128, Error> {
    Ok(provider::load(env, provider_id)?.balance)
}

pub fn get_subscriber(env: &Env, subscriber_id: u64) -> Result<Subscriber, Error> {
    subscriber::load(env, subscriber_id)
}

/// `true` iff the entitlement is still running: an entitlement ending at
/// exactly the current timestamp is already expired.
///
/// The entitlement must also belong to the provider registration currently
/// stored under `provider_id`. Unknown subscribers, removed providers and
/// entries left over from before the id was registered again all read as
/// not subscribed.
pub fn check_subscription_status(env: &Env, subscriber_id: u64, provider_id: u64) -> bool {
    subscriber::try_load(env, subscriber_id)
        .and_then(|sub| subscriber::resolve(env, &sub, provider_id))
        .is_some_and(|(entry, _)| entry.due_date > env.ledger().timestamp())
}

/// Whether `subscriber_id` is listed on the current registration of
/// `provider_id`.
pub fn is_provider_subscriber(env: &Env, provider_id: u64, subscriber_id: u64) -> bool {
    provider::try_load(env, provider_id)
        .is_some_and(|record| provider::has_subscriber(env, provider_id, &record, subscriber_id))
}

pub fn get_subscriber_balance(env: &Env, subscriber_id: u64) -> Result<i128, Error> {
    let sub = subscriber::load(env, subscriber_id)?;
    subscriber::derived_balance(env, &sub, env.ledger().timestamp())
}

/// Reference-currency value of the subscriber's derived balance.
pub fn get_subscriber_deposit_value(env: &Env, subscriber_id: u64) -> Result<i128, Error> {
    price_of(env, get_subscriber_balance(env, subscriber_id)?)
}
