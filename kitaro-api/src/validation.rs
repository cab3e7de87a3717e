//! Server-side checks on registration bodies.
//!
//! The store guarantees uniqueness; this module guards the format of the
//! two unique columns. Post links are trimmed but not format-checked.

use kitaro_core::{validate_evm_wallet, validate_x_handle, NewOperative};

use crate::error::ApiResult;
use crate::types::RegisterOperativeRequest;

/// Trim every field, drop an empty referrer and check handle and wallet
/// format.
///
/// The referrer is kept verbatim apart from trimming: crediting uses exact
/// handle equality.
pub fn validate_registration(req: RegisterOperativeRequest) -> ApiResult<NewOperative> {
    let x_handle = req.x_handle.trim().to_string();
    let evm_wallet = req.evm_wallet.trim().to_string();

    validate_x_handle(&x_handle)?;
    validate_evm_wallet(&evm_wallet)?;

    let referrer_handle = req
        .referrer
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(NewOperative {
        x_handle,
        evm_wallet,
        comment_link: req.comment_link.trim().to_string(),
        quote_link: req.quote_link.trim().to_string(),
        referrer_handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use kitaro_test_utils::fixtures::{payload, referred_payload};
    use kitaro_test_utils::generators::{arb_invalid_evm_wallet, arb_invalid_x_handle, arb_registration_payload};
    use proptest::prelude::*;

    #[test]
    fn test_fields_are_trimmed() -> ApiResult<()> {
        let mut req = referred_payload("kitaro", 1, "  @neo ");
        req.x_handle = format!("  {}\t", req.x_handle);
        req.comment_link = format!(" {} ", req.comment_link);

        let new = validate_registration(req)?;
        assert_eq!(new.x_handle, "@kitaro");
        assert_eq!(new.referrer_handle.as_deref(), Some("@neo"));
        assert!(!new.comment_link.starts_with(' '));
        Ok(())
    }

    #[test]
    fn test_blank_referrer_is_none() -> ApiResult<()> {
        let new = validate_registration(referred_payload("kitaro", 1, "   "))?;
        assert_eq!(new.referrer_handle, None);
        Ok(())
    }

    #[test]
    fn test_links_are_not_format_checked() -> ApiResult<()> {
        let mut req = payload("kitaro", 1);
        req.comment_link = "not a link".to_string();
        req.quote_link = String::new();
        assert!(validate_registration(req).is_ok());
        Ok(())
    }

    #[test]
    fn test_missing_handle_rejected() {
        let mut req = payload("kitaro", 1);
        req.x_handle = String::new();
        let err = validate_registration(req).err().map(|e| e.code);
        assert_eq!(err, Some(ErrorCode::ValidationFailed));
    }

    proptest! {
        #[test]
        fn prop_valid_payloads_pass(req in arb_registration_payload()) {
            prop_assert!(validate_registration(req).is_ok());
        }

        #[test]
        fn prop_bad_handle_or_wallet_fails(
            handle in arb_invalid_x_handle(),
            wallet in arb_invalid_evm_wallet(),
        ) {
            let mut req = payload("kitaro", 1);
            req.x_handle = handle;
            prop_assert!(validate_registration(req).is_err());

            let mut req = payload("kitaro", 1);
            req.evm_wallet = wallet;
            prop_assert!(validate_registration(req).is_err());
        }
    }
}
