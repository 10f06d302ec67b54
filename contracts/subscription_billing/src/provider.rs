//! Provider registry: records, fee rate, running balance, active flag.
//!
//! Functions here assume the caller has already been authorized; the
//! orchestration in `billing` and `admin` performs the checks.

use crate::oracle::enforce_minimum;
use crate::rate::fee_per_second;
use crate::types::{
    DataKey, Error, Provider, MAX_PROVIDER_COUNT, TTL_EXTEND_TO, TTL_THRESHOLD,
};
use soroban_sdk::{Address, Env};

fn bump(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn try_load(env: &Env, provider_id: u64) -> Option<Provider> {
    let key = DataKey::Provider(provider_id);
    let provider = env.storage().persistent().get(&key)?;
    bump(env, &key);
    Some(provider)
}

pub fn load(env: &Env, provider_id: u64) -> Result<Provider, Error> {
    try_load(env, provider_id).ok_or(Error::ProviderNotFound)
}

/// The provider registration an entitlement was bought from, if it still
/// exists. A provider removed and registered again under the same id has a
/// different generation and does not resolve.
pub fn resolve(env: &Env, provider_id: u64, generation: u64) -> Option<Provider> {
    try_load(env, provider_id).filter(|p| p.generation == generation)
}

pub fn save(env: &Env, provider_id: u64, provider: &Provider) {
    let key = DataKey::Provider(provider_id);
    env.storage().persistent().set(&key, provider);
    bump(env, &key);
}

pub fn count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::ProviderCount)
        .unwrap_or(0u32)
}

fn set_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::ProviderCount, &count);
}

fn next_generation(env: &Env) -> Result<u64, Error> {
    let generation: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextGeneration)
        .unwrap_or(0);
    let next = generation.checked_add(1).ok_or(Error::Overflow)?;
    env.storage()
        .instance()
        .set(&DataKey::NextGeneration, &next);
    Ok(generation)
}

pub fn register(
    env: &Env,
    provider_id: u64,
    owner: Address,
    monthly_fee: i128,
) -> Result<Provider, Error> {
    if env.storage().persistent().has(&DataKey::Provider(provider_id)) {
        return Err(Error::ProviderExists);
    }
    let current = count(env);
    if current >= MAX_PROVIDER_COUNT {
        return Err(Error::ProviderLimitReached);
    }
    enforce_minimum(env, monthly_fee)?;

    let provider = Provider {
        owner,
        generation: next_generation(env)?,
        fee_per_second: fee_per_second(monthly_fee),
        balance: 0,
        is_active: true,
        subscriber_count: 0,
    };
    save(env, provider_id, &provider);
    set_count(env, current + 1);
    Ok(provider)
}

/// Deletes the record and returns it so the caller can refund the balance.
/// Subscribers still referencing `provider_id` are left as they are, as are
/// membership entries of this generation.
pub fn remove(env: &Env, provider_id: u64) -> Result<Provider, Error> {
    let provider = load(env, provider_id)?;
    env.storage()
        .persistent()
        .remove(&DataKey::Provider(provider_id));
    set_count(env, count(env).saturating_sub(1));
    Ok(provider)
}

/// Changes the rate for future subscriptions and extensions only.
pub fn set_fee(env: &Env, provider_id: u64, monthly_fee: i128) -> Result<i128, Error> {
    let mut provider = load(env, provider_id)?;
    if !provider.is_active {
        return Err(Error::ProviderInactive);
    }
    enforce_minimum(env, monthly_fee)?;
    provider.fee_per_second = fee_per_second(monthly_fee);
    save(env, provider_id, &provider);
    Ok(provider.fee_per_second)
}

pub fn set_active(env: &Env, provider_id: u64, is_active: bool) -> Result<(), Error> {
    let mut provider = load(env, provider_id)?;
    provider.is_active = is_active;
    save(env, provider_id, &provider);
    Ok(())
}

pub fn credit(provider: &mut Provider, amount: i128) -> Result<(), Error> {
    provider.balance = provider
        .balance
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    Ok(())
}

pub fn debit(provider: &mut Provider, amount: i128) -> Result<(), Error> {
    if amount <= 0 || amount > provider.balance {
        return Err(Error::InvalidAmount);
    }
    provider.balance -= amount;
    Ok(())
}

// ── Subscriber membership ────────────────────────────────────────────────────

fn membership_key(provider_id: u64, provider: &Provider, subscriber_id: u64) -> DataKey {
    DataKey::Membership(provider_id, provider.generation, subscriber_id)
}

pub fn has_subscriber(
    env: &Env,
    provider_id: u64,
    provider: &Provider,
    subscriber_id: u64,
) -> bool {
    env.storage()
        .persistent()
        .has(&membership_key(provider_id, provider, subscriber_id))
}

/// Lists `subscriber_id` on the provider. The record is updated in place and
/// must be saved by the caller.
pub fn add_subscriber(
    env: &Env,
    provider_id: u64,
    provider: &mut Provider,
    subscriber_id: u64,
) {
    let key = membership_key(provider_id, provider, subscriber_id);
    if !env.storage().persistent().has(&key) {
        env.storage().persistent().set(&key, &true);
        provider.subscriber_count = provider.subscriber_count.saturating_add(1);
    }
    bump(env, &key);
}

/// Unlists `subscriber_id`. The record is updated in place and must be saved
/// by the caller.
pub fn drop_subscriber(
    env: &Env,
    provider_id: u64,
    provider: &mut Provider,
    subscriber_id: u64,
) {
    let key = membership_key(provider_id, provider, subscriber_id);
    if env.storage().persistent().has(&key) {
        env.storage().persistent().remove(&key);
        provider.subscriber_count = provider.subscriber_count.saturating_sub(1);
    }
}
