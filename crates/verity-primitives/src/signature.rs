use alloy::primitives::{hex, Address, PrimitiveSignature};
use std::fmt::Debug;

/// Checks that a personal-sign signature over `message` was produced by `wallet`.
///
/// Malformed signatures never error, they simply do not match.
pub trait SignatureChecker: Send + Sync + Debug {
    fn signature_matches(&self, message: &str, signature: &str, wallet: &Address) -> bool;
}

/// EIP-191 (`personal_sign`) recovery over secp256k1.
#[derive(Debug, Clone, Copy, Default)]
pub struct EthereumSignatureChecker;

impl EthereumSignatureChecker {
    pub fn new() -> Self {
        Self
    }

    /// Recovers the EIP-191 signer, or `None` for a malformed signature.
    pub fn recover_signer(message: &str, signature: &str) -> Option<Address> {
        let raw = hex::decode(signature.trim()).ok()?;
        let signature = PrimitiveSignature::from_raw(&raw).ok()?;
        signature.recover_address_from_msg(message.as_bytes()).ok()
    }
}

impl SignatureChecker for EthereumSignatureChecker {
    fn signature_matches(&self, message: &str, signature: &str, wallet: &Address) -> bool {
        match Self::recover_signer(message, signature) {
            Some(signer) => &signer == wallet,
            None => {
                tracing::debug!("unable to recover signer from signature");
                false
            }
        }
    }
}
