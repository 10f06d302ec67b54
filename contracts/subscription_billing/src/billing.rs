//! Operations touching both registries and the pooled custody.
//!
//! **PRs that only change how funds move between subscribers, providers and
//! the contract should edit this file only.**
//!
//! Each function validates and computes before writing. Any `Err` returned
//! from a contract entrypoint also rolls back the whole invocation, token
//! transfers included.

use crate::access::{authorize, Operation};
use crate::admin::get_config;
use crate::oracle::price_of;
use crate::types::{
    EarningsWithdrawnEvent, Error, ProviderFeeSetEvent, ProviderRegisteredEvent,
    ProviderRemovedEvent, SubscriberPrunedEvent, SubscriberRegisteredEvent,
    SubscriptionIncreasedEvent,
};
use crate::{provider, subscriber};
use soroban_sdk::{symbol_short, token, Address, Env};

fn require_positive(amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

fn pull_funds(env: &Env, from: &Address, amount: i128) -> Result<(), Error> {
    let config = get_config(env)?;
    token::Client::new(env, &config.token).transfer(from, &env.current_contract_address(), &amount);
    Ok(())
}

fn push_funds(env: &Env, to: &Address, amount: i128) -> Result<(), Error> {
    let config = get_config(env)?;
    token::Client::new(env, &config.token).transfer(&env.current_contract_address(), to, &amount);
    Ok(())
}

pub fn do_register_provider(
    env: &Env,
    owner: Address,
    provider_id: u64,
    monthly_fee: i128,
) -> Result<(), Error> {
    owner.require_auth();
    let record = provider::register(env, provider_id, owner.clone(), monthly_fee)?;
    env.events().publish(
        (symbol_short!("prov_reg"), provider_id),
        ProviderRegisteredEvent {
            provider_id,
            owner,
            fee_per_second: record.fee_per_second,
        },
    );
    Ok(())
}

/// Deletes the provider and refunds its whole balance to the owner.
pub fn do_remove_provider(env: &Env, caller: Address, provider_id: u64) -> Result<(), Error> {
    let record = provider::load(env, provider_id)?;
    authorize(env, Operation::RemoveProvider, &caller, Some(&record.owner))?;

    let removed = provider::remove(env, provider_id)?;
    if removed.balance > 0 {
        push_funds(env, &removed.owner, removed.balance)?;
    }
    env.events().publish(
        (symbol_short!("prov_rm"), provider_id),
        ProviderRemovedEvent {
            provider_id,
            owner: removed.owner,
            refund_amount: removed.balance,
        },
    );
    Ok(())
}

pub fn do_set_provider_fee(
    env: &Env,
    caller: Address,
    provider_id: u64,
    monthly_fee: i128,
) -> Result<(), Error> {
    let record = provider::load(env, provider_id)?;
    authorize(env, Operation::SetProviderFee, &caller, Some(&record.owner))?;
    let fee_per_second = provider::set_fee(env, provider_id, monthly_fee)?;
    env.events().publish(
        (symbol_short!("fee_set"), provider_id),
        ProviderFeeSetEvent {
            provider_id,
            fee_per_second,
        },
    );
    Ok(())
}

pub fn do_subscribe(
    env: &Env,
    caller: Address,
    subscriber_id: u64,
    provider_id: u64,
    deposit: i128,
) -> Result<u64, Error> {
    require_positive(deposit)?;
    let mut record = provider::load(env, provider_id)?;
    if !record.is_active {
        return Err(Error::ProviderInactive);
    }
    let mut sub = subscriber::ensure_owner(env, subscriber_id, &caller)?;
    let now = env.ledger().timestamp();
    let due_date = subscriber::add_entitlement(
        &mut sub,
        provider_id,
        record.generation,
        record.fee_per_second,
        deposit,
        now,
    )?;
    provider::credit(&mut record, deposit)?;
    provider::add_subscriber(env, provider_id, &mut record, subscriber_id);

    pull_funds(env, &caller, deposit)?;
    subscriber::save(env, subscriber_id, &sub);
    provider::save(env, provider_id, &record);

    env.events().publish(
        (symbol_short!("sub_reg"), subscriber_id),
        SubscriberRegisteredEvent {
            subscriber_id,
            provider_id,
            owner: sub.owner,
            deposit,
            due_date,
        },
    );
    Ok(due_date)
}

pub fn do_increase_deposit(
    env: &Env,
    caller: Address,
    subscriber_id: u64,
    provider_id: u64,
    amount: i128,
) -> Result<u64, Error> {
    require_positive(amount)?;
    let mut sub = subscriber::load(env, subscriber_id)?;
    authorize(env, Operation::IncreaseDeposit, &caller, Some(&sub.owner))?;
    let mut record = provider::load(env, provider_id)?;
    if !record.is_active {
        return Err(Error::ProviderInactive);
    }
    let due_date = subscriber::extend_entitlement(
        &mut sub,
        provider_id,
        record.generation,
        record.fee_per_second,
        amount,
    )?;
    provider::credit(&mut record, amount)?;
    provider::add_subscriber(env, provider_id, &mut record, subscriber_id);

    pull_funds(env, &caller, amount)?;
    subscriber::save(env, subscriber_id, &sub);
    provider::save(env, provider_id, &record);

    env.events().publish(
        (symbol_short!("sub_inc"), subscriber_id),
        SubscriptionIncreasedEvent {
            subscriber_id,
            provider_id,
            amount,
            due_date,
        },
    );
    Ok(due_date)
}

/// Pays out the provider's whole balance. The reference value is reported
/// when the oracle answers and left empty otherwise.
pub fn do_withdraw_earnings(env: &Env, caller: Address, provider_id: u64) -> Result<i128, Error> {
    let mut record = provider::load(env, provider_id)?;
    authorize(env, Operation::WithdrawEarnings, &caller, Some(&record.owner))?;
    let amount = record.balance;
    provider::debit(&mut record, amount)?;
    let reference_value = price_of(env, amount).ok();

    provider::save(env, provider_id, &record);
    push_funds(env, &record.owner, amount)?;

    env.events().publish(
        (symbol_short!("withdrawn"), provider_id),
        EarningsWithdrawnEvent {
            provider_id,
            owner: record.owner,
            amount,
            reference_value,
        },
    );
    Ok(amount)
}

pub fn do_prune_subscriber(env: &Env, caller: Address, subscriber_id: u64) -> Result<u32, Error> {
    let mut sub = subscriber::load(env, subscriber_id)?;
    authorize(env, Operation::PruneSubscriber, &caller, Some(&sub.owner))?;
    let removed = subscriber::prune(env, subscriber_id, &mut sub, env.ledger().timestamp());
    subscriber::save(env, subscriber_id, &sub);

    let count = removed.len();
    env.events().publish(
        (symbol_short!("sub_prune"), subscriber_id),
        SubscriberPrunedEvent {
            subscriber_id,
            removed,
        },
    );
    Ok(count)
}
