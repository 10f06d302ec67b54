//! Property tests for the fee and time arithmetic.
//!
//! The functions in [`crate::rate`] take no `Env`, so `proptest!` drives
//! them directly. The floor boundary needs a live contract and is covered by
//! iterating a fixed price matrix with a fresh `Env` per case.

extern crate std;

use crate::rate::{fee_per_second, purchased_seconds, reference_value, remaining_value};
use crate::{
    Asset, Error, PriceData, SubscriptionBilling, SubscriptionBillingClient, MIN_FEE_REFERENCE,
    SECONDS_PER_MONTH,
};
use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{contract, contractimpl, Address, Env};

const MONTH: i128 = SECONDS_PER_MONTH as i128;

proptest! {
    /// The rate is the truncated quotient of the monthly fee.
    #[test]
    fn prop_rate_truncates_monthly_fee(fee in 0i128..=1_000_000_000_000_000i128) {
        let rate = fee_per_second(fee);
        prop_assert!(rate * MONTH <= fee);
        prop_assert!(fee < (rate + 1) * MONTH);
    }

    /// A fee below one unit per second yields a zero rate, which cannot buy time.
    #[test]
    fn prop_sub_second_fee_cannot_buy_time(
        fee in 0i128..MONTH,
        deposit in 1i128..=1_000_000_000i128,
    ) {
        prop_assert_eq!(fee_per_second(fee), 0);
        prop_assert_eq!(purchased_seconds(deposit, 0), Err(Error::ZeroFeeRate));
    }

    /// Right after purchase the remaining value is the deposit minus the
    /// forfeited fractional second.
    #[test]
    fn prop_fresh_entitlement_value(
        deposit in 1i128..=1_000_000_000_000i128,
        rate in 1i128..=1_000_000i128,
        now in 0u64..=4_000_000_000u64,
    ) {
        let seconds = purchased_seconds(deposit, rate).unwrap();
        let value = remaining_value(now + seconds, now, rate).unwrap();
        prop_assert_eq!(value, deposit - deposit % rate);
    }

    /// Remaining value shrinks by exactly one rate per elapsed second and is
    /// zero from the due date on.
    #[test]
    fn prop_value_drains_linearly(
        seconds in 0u64..=10_000_000u64,
        elapsed in 0u64..=20_000_000u64,
        rate in 1i128..=1_000_000i128,
    ) {
        let start = 1_700_000_000u64;
        let due = start + seconds;
        let value = remaining_value(due, start + elapsed, rate).unwrap();
        if elapsed >= seconds {
            prop_assert_eq!(value, 0);
        } else {
            prop_assert_eq!(value, i128::from(seconds - elapsed) * rate);
        }
    }

    /// At a price of exactly one, the reference value is the amount itself.
    #[test]
    fn prop_par_price_is_identity(
        amount in 0i128..=1_000_000_000_000i128,
        decimals in 0u32..=18u32,
    ) {
        let par = 10i128.pow(decimals);
        prop_assert_eq!(reference_value(amount, par, decimals).unwrap(), amount);
    }
}

#[test]
fn test_negative_amount_buys_nothing() {
    assert_eq!(purchased_seconds(-1_000, 7), Err(Error::Overflow));
}

#[test]
fn test_remaining_value_overflow_is_reported() {
    assert_eq!(remaining_value(u64::MAX, 0, i128::MAX), Err(Error::Overflow));
}

// ── Floor boundary against a live contract ──────────────────────────────────

#[contract]
pub struct FixedPriceFeed;

#[contractimpl]
impl FixedPriceFeed {
    pub fn __constructor(env: Env, price: i128) {
        env.storage().instance().set(&0u32, &price);
    }

    pub fn lastprice(env: Env, _asset: Asset) -> Option<PriceData> {
        let price: i128 = env.storage().instance().get(&0u32)?;
        Some(PriceData {
            price,
            timestamp: env.ledger().timestamp(),
        })
    }

    pub fn decimals(_env: Env) -> u32 {
        8
    }
}

/// Prices at 8 decimals: par, half, double, a sliver above and below par.
const PRICE_CASES: &[i128] = &[
    100_000_000,
    50_000_000,
    200_000_000,
    100_000_001,
    99_999_999,
];

#[test]
fn prop_registration_fails_iff_below_floor() {
    for (idx, &price) in PRICE_CASES.iter().enumerate() {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(1_700_000_000);

        let feed = env.register(FixedPriceFeed, (price,));
        let token = Address::generate(&env);
        let contract_id = env.register(SubscriptionBilling, ());
        let client = SubscriptionBillingClient::new(&env, &contract_id);
        client.init(
            &Address::generate(&env),
            &token,
            &feed,
            &Asset::Stellar(token.clone()),
        );

        // Smallest fee clearing the floor at this price, and the one below it.
        let threshold = (MIN_FEE_REFERENCE * 100_000_000 + price - 1) / price;
        for (id, fee) in [(1u64, threshold - 1), (2u64, threshold)] {
            let value = fee * price / 100_000_000;
            let owner = Address::generate(&env);
            let result = client.try_register_provider(&owner, &id, &fee);
            if value < MIN_FEE_REFERENCE {
                assert_eq!(
                    result,
                    Err(Ok(Error::FeeTooLow)),
                    "case {idx}: fee {fee} worth {value} must be rejected"
                );
            } else {
                assert!(result.is_ok(), "case {idx}: fee {fee} worth {value} must pass");
                assert_eq!(
                    client.get_provider_state(&id).fee_per_second,
                    fee / MONTH,
                    "case {idx}: rate mismatch"
                );
            }
        }
        assert_eq!(client.get_provider_count(), 1, "case {idx}");
    }
}
