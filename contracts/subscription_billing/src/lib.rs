#![no_std]

// ── Modules ──────────────────────────────────────────────────────────────────
mod access;
mod admin;
mod billing;
mod oracle;
mod provider;
mod queries;
pub mod rate;
mod subscriber;
pub mod types;

// ── Re-exports (used by tests and external consumers) ────────────────────────
pub use access::{Operation, Role};
pub use oracle::{Asset, PriceData, PriceFeed, PriceFeedClient};
pub use types::*;

use soroban_sdk::{contract, contractimpl, Address, BytesN, Env};

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct SubscriptionBilling;

#[contractimpl]
impl SubscriptionBilling {
    // ── Admin / Config ───────────────────────────────────────────────────

    /// Initialize the contract: admin, payment token and price feed.
    ///
    /// # Arguments
    /// * `oracle` - SEP-40 price feed contract.
    /// * `oracle_asset` - Asset key under which the feed quotes `token`.
    pub fn init(
        env: Env,
        admin: Address,
        token: Address,
        oracle: Address,
        oracle_asset: Asset,
    ) -> Result<(), Error> {
        admin::do_init(&env, admin, token, oracle, oracle_asset)
    }

    pub fn get_config(env: Env) -> Result<Config, Error> {
        admin::get_config(&env)
    }

    /// Enable or disable new subscriptions to a provider. Admin only.
    ///
    /// Existing entitlements keep running either way.
    pub fn update_provider_state(
        env: Env,
        admin: Address,
        provider_id: u64,
        is_active: bool,
    ) -> Result<(), Error> {
        admin::do_update_provider_state(&env, admin, provider_id, is_active)
    }

    /// Permanently refuse future code upgrades. Admin only, one-shot.
    pub fn disable_upgrades(env: Env, admin: Address) -> Result<(), Error> {
        admin::do_disable_upgrades(&env, admin)
    }

    /// Replace the contract code. Admin only; fails once upgrades are disabled.
    pub fn upgrade(env: Env, admin: Address, new_wasm_hash: BytesN<32>) -> Result<(), Error> {
        admin::do_upgrade(&env, admin, new_wasm_hash)
    }

    pub fn upgrades_disabled(env: Env) -> bool {
        admin::upgrades_disabled(&env)
    }

    // ── Providers ────────────────────────────────────────────────────────

    /// Register provider `provider_id` owned by `owner`.
    ///
    /// # Errors
    /// * `ProviderExists` - the id is taken.
    /// * `ProviderLimitReached` - [`MAX_PROVIDER_COUNT`] providers exist.
    /// * `FeeTooLow` - `monthly_fee` is worth less than [`MIN_FEE_REFERENCE`].
    /// * Oracle errors when the price feed cannot be read.
    pub fn register_provider(
        env: Env,
        owner: Address,
        provider_id: u64,
        monthly_fee: i128,
    ) -> Result<(), Error> {
        billing::do_register_provider(&env, owner, provider_id, monthly_fee)
    }

    /// Delete a provider and refund its balance to the owner. Owner only.
    ///
    /// Subscribers keep their (now inert) entitlement entries until pruned.
    pub fn remove_provider(env: Env, caller: Address, provider_id: u64) -> Result<(), Error> {
        billing::do_remove_provider(&env, caller, provider_id)
    }

    /// Change the monthly fee of an active provider. Owner only.
    ///
    /// Already computed due dates are not touched.
    pub fn set_provider_fee(
        env: Env,
        caller: Address,
        provider_id: u64,
        monthly_fee: i128,
    ) -> Result<(), Error> {
        billing::do_set_provider_fee(&env, caller, provider_id, monthly_fee)
    }

    /// Pay the provider's whole balance to its owner. Owner only.
    pub fn withdraw_earnings(env: Env, caller: Address, provider_id: u64) -> Result<i128, Error> {
        billing::do_withdraw_earnings(&env, caller, provider_id)
    }

    // ── Subscribers ──────────────────────────────────────────────────────

    /// Deposit funds and open an entitlement to `provider_id`.
    ///
    /// The first subscribe for an unknown `subscriber_id` binds it to
    /// `caller`. Returns the entitlement's due date.
    pub fn subscribe(
        env: Env,
        caller: Address,
        subscriber_id: u64,
        provider_id: u64,
        deposit: i128,
    ) -> Result<u64, Error> {
        billing::do_subscribe(&env, caller, subscriber_id, provider_id, deposit)
    }

    /// Deposit more funds for an existing entitlement. Subscriber owner only.
    /// Returns the new due date.
    pub fn increase_subscription_deposit(
        env: Env,
        caller: Address,
        subscriber_id: u64,
        provider_id: u64,
        amount: i128,
    ) -> Result<u64, Error> {
        billing::do_increase_deposit(&env, caller, subscriber_id, provider_id, amount)
    }

    /// Drop expired entitlements and entries for removed providers.
    /// Subscriber owner only. Returns the number of entries dropped.
    pub fn prune_subscriber(env: Env, caller: Address, subscriber_id: u64) -> Result<u32, Error> {
        billing::do_prune_subscriber(&env, caller, subscriber_id)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn check_subscription_status(env: Env, subscriber_id: u64, provider_id: u64) -> bool {
        queries::check_subscription_status(&env, subscriber_id, provider_id)
    }

    /// Due date of an entitlement, `0` if there is none or its provider
    /// registration is gone.
    pub fn get_subscription_due_date(env: Env, subscriber_id: u64, provider_id: u64) -> u64 {
        subscriber::due_date(&env, subscriber_id, provider_id)
    }

    pub fn get_provider_state(env: Env, provider_id: u64) -> Result<Provider, Error> {
        queries::get_provider(&env, provider_id)
    }

    pub fn get_provider_earnings(env: Env, provider_id: u64) -> Result<i128, Error> {
        queries::get_provider_earnings(&env, provider_id)
    }

    pub fn get_provider_count(env: Env) -> u32 {
        provider::count(&env)
    }

    /// Whether `subscriber_id` has subscribed to the current registration of
    /// `provider_id` and has not been pruned from it since.
    pub fn is_provider_subscriber(env: Env, provider_id: u64, subscriber_id: u64) -> bool {
        queries::is_provider_subscriber(&env, provider_id, subscriber_id)
    }

    pub fn get_subscriber_state(env: Env, subscriber_id: u64) -> Result<Subscriber, Error> {
        queries::get_subscriber(&env, subscriber_id)
    }

    /// Unspent value of all running entitlements, in token units.
    pub fn get_subscriber_balance(env: Env, subscriber_id: u64) -> Result<i128, Error> {
        queries::get_subscriber_balance(&env, subscriber_id)
    }

    /// [`Self::get_subscriber_balance`] converted to the reference currency.
    pub fn get_subscriber_deposit_value_usd(env: Env, subscriber_id: u64) -> Result<i128, Error> {
        queries::get_subscriber_deposit_value(&env, subscriber_id)
    }
}


#[cfg(test)]
mod property_test;
