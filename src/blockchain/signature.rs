//! Recovery of detached secp256k1 signatures.
//!
//! Wallets that sign offline hand over only `r || s` and the address they
//! claim to sign for. The recovery id is not transmitted, so it is searched:
//! each candidate id reconstructs a public key and the first key that hashes
//! to the claimed address wins.

use alloy::primitives::{keccak256, Address, Signature, B256, U256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

/// Length of a detached `r || s` signature.
pub const RAW_SIGNATURE_LEN: usize = 64;

/// Order of the secp256k1 group.
pub const SECP256K1_N: U256 = U256::from_limbs([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// `SECP256K1_N / 2`; canonical signatures have `s <= SECP256K1_HALF_N`.
pub const SECP256K1_HALF_N: U256 = U256::from_limbs([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("invalid signature, could not construct a recoverable key")]
    UnrecoverableSignature,

    /// Ids 2 and 3 mark an `r` that overflowed the group order; a transaction
    /// signature only carries the y-parity bit, so they cannot be encoded.
    #[error("recovery id {0} cannot be encoded in a transaction signature")]
    UnsupportedRecoveryId(u8),
}

/// A signature with canonical `s` and the recovery id that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl RecoveredSignature {
    /// `r || s || v`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    /// Convert into the y-parity form used by transaction envelopes.
    pub fn to_tx_signature(&self) -> Result<Signature, SignatureError> {
        if self.v > 1 {
            return Err(SignatureError::UnsupportedRecoveryId(self.v));
        }
        Ok(Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            self.v == 1,
        ))
    }
}

/// Fold `s` into the lower half of the curve order.
///
/// Returns `None` when `s` is zero or not below the order.
pub fn canonical_s(s: U256) -> Option<U256> {
    if s.is_zero() || s >= SECP256K1_N {
        return None;
    }
    if s > SECP256K1_HALF_N {
        Some(SECP256K1_N - s)
    } else {
        Some(s)
    }
}

/// Recover the signature `from` produced over `hash`.
pub fn recover_signature(
    hash: &B256,
    raw: &[u8],
    from: Address,
) -> Result<RecoveredSignature, SignatureError> {
    if raw.len() != RAW_SIGNATURE_LEN {
        return Err(SignatureError::InvalidSignatureLength(raw.len()));
    }

    let r = B256::from_slice(&raw[..32]);
    let s = canonical_s(U256::from_be_slice(&raw[32..]))
        .ok_or(SignatureError::UnrecoverableSignature)?;
    let s = B256::from(s.to_be_bytes::<32>());

    let mut compact = [0u8; RAW_SIGNATURE_LEN];
    compact[..32].copy_from_slice(r.as_slice());
    compact[32..].copy_from_slice(s.as_slice());
    let signature =
        EcdsaSignature::from_slice(&compact).map_err(|_| SignatureError::UnrecoverableSignature)?;

    for v in 0u8..4 {
        let Some(recovery_id) = RecoveryId::from_byte(v) else {
            continue;
        };
        let Ok(key) = VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id)
        else {
            continue;
        };
        if public_key_to_address(&key) == from {
            return Ok(RecoveredSignature { r, s, v });
        }
    }

    Err(SignatureError::UnrecoverableSignature)
}

/// Ethereum address of a public key: last 20 bytes of keccak(x || y).
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}
