//! Subscriber registry: ownership, entitlements and the derived balance.
//!
//! A subscriber's balance is never stored. It is recomputed on demand from
//! the due dates and the providers' current rates.

use crate::access::{authorize, Operation};
use crate::provider;
use crate::rate::{purchased_seconds, remaining_value};
use crate::types::{
    DataKey, Entitlement, Error, Provider, Subscriber, MAX_SUBSCRIBED_PROVIDERS, TTL_EXTEND_TO,
    TTL_THRESHOLD,
};
use soroban_sdk::{Address, Env, Map, Vec};

pub fn try_load(env: &Env, subscriber_id: u64) -> Option<Subscriber> {
    let key = DataKey::Subscriber(subscriber_id);
    let subscriber = env.storage().persistent().get(&key)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Some(subscriber)
}

pub fn load(env: &Env, subscriber_id: u64) -> Result<Subscriber, Error> {
    try_load(env, subscriber_id).ok_or(Error::SubscriberNotFound)
}

pub fn save(env: &Env, subscriber_id: u64, subscriber: &Subscriber) {
    let key = DataKey::Subscriber(subscriber_id);
    env.storage().persistent().set(&key, subscriber);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// First subscribe wins: an unknown id is bound to `caller`, a known one
/// must be owned by `caller`. The returned record is not yet persisted.
pub fn ensure_owner(env: &Env, subscriber_id: u64, caller: &Address) -> Result<Subscriber, Error> {
    match try_load(env, subscriber_id) {
        Some(subscriber) => {
            authorize(env, Operation::Subscribe, caller, Some(&subscriber.owner))?;
            Ok(subscriber)
        }
        None => {
            caller.require_auth();
            Ok(Subscriber {
                owner: caller.clone(),
                active_providers: Vec::new(env),
                entitlements: Map::new(env),
            })
        }
    }
}

/// Opens an entitlement to registration `generation` of `provider_id`
/// running until `now + deposit / fee_per_second`. Returns the due date.
///
/// A leftover entry from an earlier registration of the same id is
/// overwritten in place and does not count twice against the cap.
pub fn add_entitlement(
    subscriber: &mut Subscriber,
    provider_id: u64,
    generation: u64,
    fee_per_second: i128,
    deposit: i128,
    now: u64,
) -> Result<u64, Error> {
    let existing = subscriber.entitlements.get(provider_id);
    if let Some(entry) = &existing {
        if entry.generation == generation {
            return Err(Error::AlreadySubscribed);
        }
    }
    let seconds = purchased_seconds(deposit, fee_per_second)?;
    if existing.is_none() && subscriber.active_providers.len() >= MAX_SUBSCRIBED_PROVIDERS {
        return Err(Error::SubscriptionLimitReached);
    }
    let due_date = now.checked_add(seconds).ok_or(Error::Overflow)?;

    if existing.is_none() {
        subscriber.active_providers.push_back(provider_id);
    }
    subscriber.entitlements.set(
        provider_id,
        Entitlement {
            due_date,
            generation,
        },
    );
    Ok(due_date)
}

/// Pushes the due date for `provider_id` forward by `amount / fee_per_second`.
///
/// The extension is added to the stored due date even when it already lies
/// in the past, so a subscriber topping up an expired entitlement can stay
/// expired for a while after paying. `prune_subscriber` followed by a fresh
/// `subscribe` anchors the new period at the current time instead.
///
/// An entry bought from an earlier registration of `provider_id` is not
/// extended: it fails with `NotSubscribed` like a missing one.
pub fn extend_entitlement(
    subscriber: &mut Subscriber,
    provider_id: u64,
    generation: u64,
    fee_per_second: i128,
    amount: i128,
) -> Result<u64, Error> {
    let current = subscriber
        .entitlements
        .get(provider_id)
        .filter(|entry| entry.generation == generation)
        .ok_or(Error::NotSubscribed)?;
    let seconds = purchased_seconds(amount, fee_per_second)?;
    let due_date = current
        .due_date
        .checked_add(seconds)
        .ok_or(Error::Overflow)?;
    subscriber.entitlements.set(
        provider_id,
        Entitlement {
            due_date,
            generation,
        },
    );
    Ok(due_date)
}

/// The entitlement to `provider_id` together with the provider registration
/// it was bought from. `None` when either is gone.
pub fn resolve(
    env: &Env,
    subscriber: &Subscriber,
    provider_id: u64,
) -> Option<(Entitlement, Provider)> {
    let entry = subscriber.entitlements.get(provider_id)?;
    let record = provider::resolve(env, provider_id, entry.generation)?;
    Some((entry, record))
}

/// Due date of a resolvable entitlement, `0` otherwise.
pub fn due_date(env: &Env, subscriber_id: u64, provider_id: u64) -> u64 {
    try_load(env, subscriber_id)
        .and_then(|subscriber| resolve(env, &subscriber, provider_id))
        .map(|(entry, _)| entry.due_date)
        .unwrap_or(0)
}

/// Sum of `(due_date - now) * fee_per_second` over unexpired entitlements.
/// Entries whose provider registration no longer exists contribute zero.
pub fn derived_balance(env: &Env, subscriber: &Subscriber, now: u64) -> Result<i128, Error> {
    let mut total: i128 = 0;
    for provider_id in subscriber.active_providers.iter() {
        let Some(entry) = subscriber.entitlements.get(provider_id) else {
            continue;
        };
        if entry.due_date <= now {
            continue;
        }
        let rate = provider::resolve(env, provider_id, entry.generation)
            .map(|p| p.fee_per_second)
            .unwrap_or(0);
        total = total
            .checked_add(remaining_value(entry.due_date, now, rate)?)
            .ok_or(Error::Overflow)?;
    }
    Ok(total)
}

/// Drops entitlements whose provider registration is gone or whose due date
/// has passed, and unlists the subscriber from live providers it expired
/// on. Returns the dropped provider ids.
pub fn prune(env: &Env, subscriber_id: u64, subscriber: &mut Subscriber, now: u64) -> Vec<u64> {
    let mut kept = Vec::new(env);
    let mut removed = Vec::new(env);
    for provider_id in subscriber.active_providers.iter() {
        let Some(entry) = subscriber.entitlements.get(provider_id) else {
            removed.push_back(provider_id);
            continue;
        };
        match provider::resolve(env, provider_id, entry.generation) {
            None => removed.push_back(provider_id),
            Some(mut record) if entry.due_date <= now => {
                provider::drop_subscriber(env, provider_id, &mut record, subscriber_id);
                provider::save(env, provider_id, &record);
                removed.push_back(provider_id);
            }
            Some(_) => kept.push_back(provider_id),
        }
    }
    for provider_id in removed.iter() {
        subscriber.entitlements.remove(provider_id);
    }
    subscriber.active_providers = kept;
    removed
}
