//! Format rules for operative fields.
//!
//! These run in the wizard before any network call. The API server reuses
//! the handle and wallet rules as a guard on the stored invariants; post
//! links are only ever checked here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[A-Za-z0-9_]{1,15}$").expect("Invalid handle regex"));

// Prefix match only: trailing query strings such as `?s=46` are accepted.
static STATUS_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?(twitter\.com|x\.com)/[A-Za-z0-9_]+/status/[0-9]+")
        .expect("Invalid status link regex")
});

static EVM_WALLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("Invalid wallet regex"));

/// Validate an X handle: `@` followed by 1-15 word characters.
pub fn validate_x_handle(handle: &str) -> Result<(), ValidationError> {
    if HANDLE_RE.is_match(handle) {
        Ok(())
    } else {
        Err(ValidationError::InvalidHandle)
    }
}

/// Validate a direct link to an X (or twitter.com) post.
pub fn validate_status_link(link: &str) -> Result<(), ValidationError> {
    if STATUS_LINK_RE.is_match(link) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLink)
    }
}

/// Validate an EVM address: `0x` followed by exactly 40 hex characters.
pub fn validate_evm_wallet(wallet: &str) -> Result<(), ValidationError> {
    if EVM_WALLET_RE.is_match(wallet) {
        Ok(())
    } else {
        Err(ValidationError::InvalidWallet)
    }
}

/// Normalize raw handle input the way the handle editor does: trim and
/// inject a leading `@` when the operator forgot it.
pub fn normalize_handle_input(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{}", trimmed)
    }
}

/// Turn an incoming `ref` query value into the handle form stored in the
/// registry.
///
/// Referral links carry the handle without its `@`, so the prefix is put
/// back here. Empty values mean "no referrer".
pub fn normalize_referrer(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "@" {
        return None;
    }
    Some(normalize_handle_input(trimmed))
}

/// Personal referral link: the operative's handle, minus `@`, as the `ref`
/// query parameter on the landing route.
pub fn referral_link(origin: &str, handle: &str) -> String {
    let bare = handle.strip_prefix('@').unwrap_or(handle);
    format!("{}/?ref={}", origin.trim_end_matches('/'), bare)
}

/// Extract the `ref` parameter from an entry URL or raw query string.
///
/// The value is form-decoded (`+` and `%XX`), so `ref=%40boss` names `@boss`.
pub fn referrer_from_query(url_or_query: &str) -> Option<String> {
    let query = match url_or_query.split_once('?') {
        Some((_, q)) => q,
        None => url_or_query,
    };
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "ref")
        .and_then(|(_, value)| normalize_referrer(&decode_query_value(value)))
}

fn decode_query_value(value: &str) -> String {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_handle_requires_at_prefix() {
        assert_eq!(validate_x_handle("foo"), Err(ValidationError::InvalidHandle));
        assert!(validate_x_handle("@foo").is_ok());
    }

    #[test]
    fn test_handle_length_bounds() {
        assert!(validate_x_handle("@").is_err());
        assert!(validate_x_handle("@a").is_ok());
        assert!(validate_x_handle(&format!("@{}", "a".repeat(15))).is_ok());
        assert!(validate_x_handle(&format!("@{}", "a".repeat(16))).is_err());
        assert!(validate_x_handle("@has space").is_err());
        assert!(validate_x_handle("@dash-ed").is_err());
    }

    #[test]
    fn test_wallet_format() {
        assert_eq!(validate_evm_wallet("0x123"), Err(ValidationError::InvalidWallet));
        assert!(validate_evm_wallet("0x52908400098527886E0F7030069857D2E4169EE7").is_ok());
        assert!(validate_evm_wallet(&format!("0x{}", "g".repeat(40))).is_err());
        assert!(validate_evm_wallet(&format!("0X{}", "a".repeat(40))).is_err());
        assert!(validate_evm_wallet(&format!("0x{}", "a".repeat(41))).is_err());
    }

    #[test]
    fn test_status_link_format() {
        assert_eq!(
            validate_status_link("https://example.com/post"),
            Err(ValidationError::InvalidLink)
        );
        assert!(validate_status_link("https://x.com/user/status/12345").is_ok());
        assert!(validate_status_link("http://www.twitter.com/user_1/status/9?s=46").is_ok());
        assert!(validate_status_link("https://x.com/user/likes/12345").is_err());
        assert!(validate_status_link("ftp://x.com/user/status/1").is_err());
    }

    #[test]
    fn test_normalize_handle_input() {
        assert_eq!(normalize_handle_input("kitaro"), "@kitaro");
        assert_eq!(normalize_handle_input("  @kitaro "), "@kitaro");
        assert_eq!(normalize_handle_input("   "), "");
    }

    #[test]
    fn test_referral_link_strips_at() {
        assert_eq!(
            referral_link("https://megakitaro.xyz/", "@kitaro"),
            "https://megakitaro.xyz/?ref=kitaro"
        );
    }

    #[test]
    fn test_referrer_from_query() {
        assert_eq!(
            referrer_from_query("https://megakitaro.xyz/?ref=kitaro"),
            Some("@kitaro".to_string())
        );
        assert_eq!(referrer_from_query("a=1&ref=neo#top"), Some("@neo".to_string()));
        assert_eq!(referrer_from_query("https://megakitaro.xyz/?ref="), None);
        assert_eq!(referrer_from_query("https://megakitaro.xyz/"), None);
    }

    #[test]
    fn test_referrer_from_query_decodes_escapes() {
        assert_eq!(
            referrer_from_query("https://megakitaro.xyz/?ref=%40boss"),
            Some("@boss".to_string())
        );
        assert_eq!(referrer_from_query("ref=neo_%31"), Some("@neo_1".to_string()));
        assert_eq!(referrer_from_query("ref=+kitaro+"), Some("@kitaro".to_string()));
        assert_eq!(referrer_from_query("ref=%40"), None);
        assert_eq!(referrer_from_query("ref=%ZZ"), Some("@%ZZ".to_string()));
    }

    proptest! {
        #[test]
        fn prop_valid_handles_accepted(name in "[A-Za-z0-9_]{1,15}") {
            let at = format!("@{}", name);
            prop_assert!(validate_x_handle(&at).is_ok());
            prop_assert!(validate_x_handle(&name).is_err());
        }

        #[test]
        fn prop_wallet_needs_exactly_40_hex(hex in "[a-fA-F0-9]{0,60}") {
            let wallet = format!("0x{}", hex);
            prop_assert_eq!(validate_evm_wallet(&wallet).is_ok(), hex.len() == 40);
        }

        #[test]
        fn prop_referral_link_round_trips_through_query(name in "[A-Za-z0-9_]{1,15}") {
            let handle = format!("@{}", name);
            let link = referral_link("https://megakitaro.xyz", &handle);
            prop_assert_eq!(referrer_from_query(&link), Some(handle));
        }
    }
}
