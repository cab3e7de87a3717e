//! KITARO Test Utilities
//!
//! Shared test infrastructure for the registry workspace:
//! - Proptest generators for handles, wallets, post links and payloads
//! - Fixtures for common registration scenarios
//! - Assertions for registry ordering and validation failures

pub use kitaro_core::{
    registry_order, NewOperative, Operative, RegistrationPayload, RegistryEntry, Timestamp,
    ValidationError,
};

use chrono::Utc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for registry inputs.

    use super::*;
    use proptest::prelude::*;

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// Generate a well-formed X handle (`@` plus 1-15 word characters).
    pub fn arb_x_handle() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{1,15}".prop_map(|name| format!("@{}", name))
    }

    /// Generate a handle that fails validation.
    pub fn arb_invalid_x_handle() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z0-9_]{1,15}",
            "[A-Za-z0-9_]{16,30}".prop_map(|name| format!("@{}", name)),
            "[A-Za-z0-9_]{0,6}[.!#-][A-Za-z0-9_]{0,6}".prop_map(|name| format!("@{}", name)),
            Just("@".to_string()),
        ]
    }

    /// Generate a well-formed EVM wallet with mixed-case hex.
    pub fn arb_evm_wallet() -> impl Strategy<Value = String> {
        "[a-fA-F0-9]{40}".prop_map(|hex| format!("0x{}", hex))
    }

    /// Generate a wallet that fails validation.
    pub fn arb_invalid_evm_wallet() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-fA-F0-9]{0,39}".prop_map(|hex| format!("0x{}", hex)),
            "[a-fA-F0-9]{41,50}".prop_map(|hex| format!("0x{}", hex)),
            "[a-fA-F0-9]{40}",
            "[g-zG-Z]{40}".prop_map(|hex| format!("0x{}", hex)),
        ]
    }

    /// Generate a link to an X post.
    pub fn arb_status_link() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("https"), Just("http")],
            prop_oneof![
                Just("x.com"),
                Just("twitter.com"),
                Just("www.x.com"),
                Just("www.twitter.com"),
            ],
            "[A-Za-z0-9_]{1,15}",
            1u64..u64::MAX,
        )
            .prop_map(|(scheme, host, user, id)| {
                format!("{}://{}/{}/status/{}", scheme, host, user, id)
            })
    }

    /// Generate a registration body that passes every format check.
    pub fn arb_registration_payload() -> impl Strategy<Value = RegistrationPayload> {
        (
            arb_x_handle(),
            arb_status_link(),
            arb_status_link(),
            arb_evm_wallet(),
            prop::option::of(arb_x_handle()),
        )
            .prop_map(|(x_handle, comment_link, quote_link, evm_wallet, referrer)| {
                RegistrationPayload {
                    x_handle,
                    comment_link,
                    quote_link,
                    evm_wallet,
                    referrer,
                }
            })
    }

    /// Generate a leaderboard row.
    pub fn arb_registry_entry() -> impl Strategy<Value = RegistryEntry> {
        (arb_x_handle(), arb_evm_wallet(), 0i32..500, arb_timestamp()).prop_map(
            |(x_handle, evm_wallet, referrals, created_at)| RegistryEntry {
                x_handle,
                evm_wallet,
                referrals,
                created_at,
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built registration fixtures.

    use super::*;

    /// Deterministic valid wallet for operative number `n`.
    pub fn wallet(n: u32) -> String {
        format!("0x{:040x}", n)
    }

    /// A valid registration body for `name` (no leading `@`).
    pub fn payload(name: &str, n: u32) -> RegistrationPayload {
        RegistrationPayload {
            x_handle: format!("@{}", name),
            comment_link: format!("https://x.com/{}/status/{}", name, 1000 + n),
            quote_link: format!("https://x.com/{}/status/{}", name, 2000 + n),
            evm_wallet: wallet(n),
            referrer: None,
        }
    }

    /// A valid registration body naming `referrer` (with `@`).
    pub fn referred_payload(name: &str, n: u32, referrer: &str) -> RegistrationPayload {
        RegistrationPayload {
            referrer: Some(referrer.to_string()),
            ..payload(name, n)
        }
    }

    /// The record a store would create for `payload(name, n)`.
    pub fn new_operative(name: &str, n: u32) -> NewOperative {
        let p = payload(name, n);
        NewOperative {
            x_handle: p.x_handle,
            evm_wallet: p.evm_wallet,
            comment_link: p.comment_link,
            quote_link: p.quote_link,
            referrer_handle: p.referrer,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for registry invariants.

    use super::*;

    /// Assert rows follow leaderboard order: referrals descending, then
    /// earliest registration first.
    #[track_caller]
    pub fn assert_registry_ordered(rows: &[RegistryEntry]) {
        for pair in rows.windows(2) {
            assert_ne!(
                registry_order(&pair[0], &pair[1]),
                std::cmp::Ordering::Greater,
                "Rows out of order: {:?} before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    /// Assert a result failed with the given validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(
        result: &Result<T, ValidationError>,
        expected: ValidationError,
    ) {
        match result {
            Err(e) => assert_eq!(*e, expected),
            Ok(v) => panic!("Expected {:?}, got Ok({:?})", expected, v),
        }
    }
}
