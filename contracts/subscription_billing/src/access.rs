//! Capability checks gating every mutating operation.
//!
//! Two roles exist: the owner recorded on a provider or subscriber, and the
//! single system admin from [`crate::types::Config`].

use crate::admin::get_config;
use crate::types::Error;
use soroban_sdk::{Address, Env};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    RemoveProvider,
    SetProviderFee,
    WithdrawEarnings,
    Subscribe,
    IncreaseDeposit,
    PruneSubscriber,
    UpdateProviderState,
    DisableUpgrades,
    Upgrade,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Owner,
    Admin,
}

impl Operation {
    pub const fn role(self) -> Role {
        match self {
            Operation::UpdateProviderState | Operation::DisableUpgrades | Operation::Upgrade => {
                Role::Admin
            }
            _ => Role::Owner,
        }
    }
}

/// Requires `actor` to have signed and to hold the role `op` needs.
///
/// `owner` is the owner recorded on the target record; it is ignored for
/// admin operations and must be present for owner operations.
pub fn authorize(
    env: &Env,
    op: Operation,
    actor: &Address,
    owner: Option<&Address>,
) -> Result<(), Error> {
    actor.require_auth();
    let allowed = match op.role() {
        Role::Admin => get_config(env)?.admin == *actor,
        Role::Owner => owner == Some(actor),
    };
    if !allowed {
        return Err(Error::Unauthorized);
    }
    Ok(())
}
