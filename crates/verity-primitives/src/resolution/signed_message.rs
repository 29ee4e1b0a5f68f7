use alloy::primitives::Address;

use crate::{signature::SignatureChecker, status::AddressMatch, Status};

/// Off-chain signature verdict. First matching rule wins:
/// no wallet or no signature is PENDING, a wallet other than the pinned one is FAILED,
/// a signature that does not recover to the wallet is FAILED, anything else is SUCCESS.
pub fn resolve_signed_message(
    requested_wallet: &AddressMatch,
    message: &str,
    wallet: Option<&Address>,
    signature: Option<&str>,
    checker: &dyn SignatureChecker,
) -> Status {
    let Some(wallet) = wallet else {
        return Status::Pending;
    };
    let Some(signature) = signature else {
        return Status::Pending;
    };

    if !requested_wallet.matches(wallet) {
        tracing::debug!(%wallet, "message signed by a wallet other than the requested one");
        return Status::Failed;
    }

    if !checker.signature_matches(message, signature, wallet) {
        return Status::Failed;
    }

    Status::Success
}

/// One-shot intents are removed after their first successful read.
pub fn should_expire(status: Status, store_indefinitely: bool) -> bool {
    status.is_success() && !store_indefinitely
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const W1: Address = address!("865f603F42ca1231e5B5F90e15663b0FE19F0b21");
    const W2: Address = address!("1111111111111111111111111111111111111111");

    /// Accepts exactly one signature string and counts how often it was consulted.
    #[derive(Debug, Default)]
    struct FixedChecker {
        calls: AtomicUsize,
    }

    impl SignatureChecker for FixedChecker {
        fn signature_matches(&self, _message: &str, signature: &str, _wallet: &Address) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            signature == "valid"
        }
    }

    #[test]
    fn missing_wallet_or_signature_is_pending() {
        let checker = FixedChecker::default();
        let requested = AddressMatch::Pinned(W1);
        assert_eq!(
            resolve_signed_message(&requested, "m", None, Some("valid"), &checker),
            Status::Pending
        );
        assert_eq!(
            resolve_signed_message(&requested, "m", Some(&W1), None, &checker),
            Status::Pending
        );
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn other_wallet_fails_before_signature_check() {
        let checker = FixedChecker::default();
        let status = resolve_signed_message(
            &AddressMatch::Pinned(W1),
            "m",
            Some(&W2),
            Some("valid"),
            &checker,
        );
        assert_eq!(status, Status::Failed);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_signature_fails() {
        let checker = FixedChecker::default();
        let status = resolve_signed_message(
            &AddressMatch::Wildcard,
            "m",
            Some(&W2),
            Some("forged"),
            &checker,
        );
        assert_eq!(status, Status::Failed);
    }

    #[test]
    fn valid_signature_succeeds() {
        let checker = FixedChecker::default();
        assert_eq!(
            resolve_signed_message(
                &AddressMatch::Wildcard,
                "m",
                Some(&W2),
                Some("valid"),
                &checker
            ),
            Status::Success
        );
        assert_eq!(
            resolve_signed_message(
                &AddressMatch::Pinned(W1),
                "m",
                Some(&W1),
                Some("valid"),
                &checker
            ),
            Status::Success
        );
    }

    #[test]
    fn expires_only_successful_non_persistent_intents() {
        assert!(should_expire(Status::Success, false));
        assert!(!should_expire(Status::Success, true));
        assert!(!should_expire(Status::Pending, false));
        assert!(!should_expire(Status::Failed, false));
    }
}
