//! Admin and config: init, provider state toggle, upgrade gate.
//!
//! **PRs that only change admin behavior should edit this file only.**

use crate::access::{authorize, Operation};
use crate::oracle::Asset;
use crate::provider;
use crate::types::{Config, DataKey, Error, ProviderStateUpdatedEvent, UpgradesDisabledEvent};
use soroban_sdk::{symbol_short, Address, BytesN, Env};

pub fn do_init(
    env: &Env,
    admin: Address,
    token: Address,
    oracle: Address,
    oracle_asset: Asset,
) -> Result<(), Error> {
    if env.storage().instance().has(&DataKey::Config) {
        return Err(Error::AlreadyInitialized);
    }
    admin.require_auth();
    let config = Config {
        admin,
        token,
        oracle,
        oracle_asset,
    };
    env.storage().instance().set(&DataKey::Config, &config);
    env.storage().instance().set(&DataKey::ProviderCount, &0u32);
    env.storage().instance().set(&DataKey::UpgradesDisabled, &false);
    Ok(())
}

pub fn get_config(env: &Env) -> Result<Config, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn do_update_provider_state(
    env: &Env,
    admin: Address,
    provider_id: u64,
    is_active: bool,
) -> Result<(), Error> {
    authorize(env, Operation::UpdateProviderState, &admin, None)?;
    provider::set_active(env, provider_id, is_active)?;
    env.events().publish(
        (symbol_short!("prov_st"), provider_id),
        ProviderStateUpdatedEvent {
            provider_id,
            is_active,
        },
    );
    Ok(())
}

// =============================================================================
// Upgrade gate
// =============================================================================

pub fn upgrades_disabled(env: &Env) -> bool {
    env.storage()
        .instance()
        .get::<_, bool>(&DataKey::UpgradesDisabled)
        .unwrap_or(false)
}

/// Latches the upgrade gate. One-shot: a second call fails.
pub fn do_disable_upgrades(env: &Env, admin: Address) -> Result<(), Error> {
    authorize(env, Operation::DisableUpgrades, &admin, None)?;
    if upgrades_disabled(env) {
        return Err(Error::UpgradesDisabled);
    }
    env.storage()
        .instance()
        .set(&DataKey::UpgradesDisabled, &true);
    env.events()
        .publish((symbol_short!("upg_off"),), UpgradesDisabledEvent { admin });
    Ok(())
}

/// Replaces the contract code. Refused unconditionally once the gate is
/// latched, whoever the caller is.
pub fn do_upgrade(env: &Env, admin: Address, new_wasm_hash: BytesN<32>) -> Result<(), Error> {
    if upgrades_disabled(env) {
        return Err(Error::UpgradesDisabled);
    }
    authorize(env, Operation::Upgrade, &admin, None)?;
    env.deployer().update_current_contract_wasm(new_wasm_hash);
    Ok(())
}
