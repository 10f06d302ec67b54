use crate::oracle::Asset;
use soroban_sdk::{contracterror, contracttype, Address, Map, Vec};

/// Length of one billing month. Monthly fees are converted to a per-second
/// rate by integer division with this constant.
pub const SECONDS_PER_MONTH: u64 = 30 * 24 * 60 * 60;

/// Minimum monthly fee, in reference-currency units (USD at 7 decimals).
pub const MIN_FEE_REFERENCE: i128 = 50 * 10_000_000;

/// Ceiling on the number of simultaneously registered providers.
pub const MAX_PROVIDER_COUNT: u32 = 1_000;

/// Maximum number of providers one subscriber may hold entitlements for.
pub const MAX_SUBSCRIBED_PROVIDERS: u32 = 100;

/// Oldest oracle quote (in seconds) accepted for fee floor checks.
pub const ORACLE_MAX_AGE: u64 = 3_600;

pub(crate) const TTL_THRESHOLD: u32 = 17_280;
pub(crate) const TTL_EXTEND_TO: u32 = 518_400;

/// Storage keys. Config, counters and the upgrade latch live in instance
/// storage; provider and subscriber records are persistent entries.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    ProviderCount,
    /// Source of [`Provider::generation`]. Never reset, so an id that is
    /// removed and registered again gets a fresh generation.
    NextGeneration,
    UpgradesDisabled,
    Provider(u64),
    Subscriber(u64),
    /// `(provider_id, generation, subscriber_id)`: subscriber listed on
    /// that registration of the provider.
    Membership(u64, u64, u64),
}

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    // Authorization
    Unauthorized = 401,

    // Preconditions
    AlreadyInitialized = 1,
    NotInitialized = 2,
    ProviderExists = 1001,
    ProviderNotFound = 1002,
    ProviderLimitReached = 1003,
    ProviderInactive = 1004,
    FeeTooLow = 1005,
    SubscriberNotFound = 1101,
    AlreadySubscribed = 1102,
    NotSubscribed = 1103,
    SubscriptionLimitReached = 1104,
    InvalidAmount = 1105,
    UpgradesDisabled = 1201,

    // Arithmetic
    ZeroFeeRate = 2001,
    Overflow = 2002,

    // Price oracle
    OracleUnavailable = 3001,
    StalePrice = 3002,
    InvalidPrice = 3003,
}

impl Error {
    pub const fn to_code(self) -> u32 {
        self as u32
    }
}

/// Contract-wide configuration written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// System admin: toggles provider state and owns the upgrade latch.
    pub admin: Address,
    /// Payment token. Deposits are pooled in this contract's own balance.
    pub token: Address,
    /// Price feed contract used for the fee floor.
    pub oracle: Address,
    /// Asset key quoted by the price feed for `token`.
    pub oracle_asset: Asset,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Provider {
    pub owner: Address,
    /// Distinguishes this registration from earlier ones under the same id.
    pub generation: u64,
    /// Monthly fee divided by [`SECONDS_PER_MONTH`], truncated.
    pub fee_per_second: i128,
    /// Deposits received minus earnings withdrawn.
    pub balance: i128,
    /// Gate on new subscriptions and deposit increases.
    pub is_active: bool,
    /// Number of subscribers holding a live or expired-but-unpruned
    /// entitlement. Membership itself is stored per subscriber under
    /// [`DataKey::Membership`].
    pub subscriber_count: u32,
}

/// Paid-for access to one provider registration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entitlement {
    /// Absolute expiry timestamp.
    pub due_date: u64,
    /// [`Provider::generation`] at subscribe time. An entry whose generation
    /// no longer matches the stored provider refers to a removed provider.
    pub generation: u64,
}

/// A subscriber's entitlements.
///
/// Provider ids held here are weak references: a provider removed after the
/// fact, or removed and registered again under the same id, stays listed
/// until [`crate::SubscriptionBilling::prune_subscriber`] runs and
/// contributes nothing to the derived balance.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscriber {
    pub owner: Address,
    pub active_providers: Vec<u64>,
    pub entitlements: Map<u64, Entitlement>,
}

// ── Events ───────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug)]
pub struct ProviderRegisteredEvent {
    pub provider_id: u64,
    pub owner: Address,
    pub fee_per_second: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ProviderRemovedEvent {
    pub provider_id: u64,
    pub owner: Address,
    pub refund_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SubscriberRegisteredEvent {
    pub subscriber_id: u64,
    pub provider_id: u64,
    pub owner: Address,
    pub deposit: i128,
    pub due_date: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SubscriptionIncreasedEvent {
    pub subscriber_id: u64,
    pub provider_id: u64,
    pub amount: i128,
    pub due_date: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ProviderFeeSetEvent {
    pub provider_id: u64,
    pub fee_per_second: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct EarningsWithdrawnEvent {
    pub provider_id: u64,
    pub owner: Address,
    pub amount: i128,
    /// Reference-currency value of `amount`, `None` when the oracle could
    /// not be read. Withdrawals never wait on the oracle.
    pub reference_value: Option<i128>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ProviderStateUpdatedEvent {
    pub provider_id: u64,
    pub is_active: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct UpgradesDisabledEvent {
    pub admin: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SubscriberPrunedEvent {
    pub subscriber_id: u64,
    /// Provider ids dropped from the subscriber's entitlements.
    pub removed: Vec<u64>,
}
