//! Transaction decoding, signing-hash derivation and assembly.
//!
//! # Responsibilities
//! - Decode signed EIP-2718 envelopes (legacy RLP or typed)
//! - Decode unsigned legacy transactions sent alongside a detached signature
//! - Build and encode unsigned legacy transfers for offline signing
//! - Attach a recovered signature to an unsigned transaction

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{SignableTransaction, Transaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Bytes, Signature, TxKind, B256, U256};
use alloy::rlp::{Decodable, Encodable, Header};
use thiserror::Error;

/// Gas consumed by a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

#[derive(Debug, Error)]
pub enum TxDecodeError {
    #[error("rlp: {0}")]
    Rlp(#[from] alloy::rlp::Error),

    #[error("envelope: {0}")]
    Envelope(String),

    #[error("expected an RLP list")]
    NotAList,

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("invalid sender: {0}")]
    Sender(String),
}

/// Decode a signed transaction as it would be passed to
/// `eth_sendRawTransaction`.
pub fn decode_signed(raw: &[u8]) -> Result<TxEnvelope, TxDecodeError> {
    let mut buf = raw;
    let envelope =
        TxEnvelope::decode_2718(&mut buf).map_err(|e| TxDecodeError::Envelope(e.to_string()))?;
    if !buf.is_empty() {
        return Err(TxDecodeError::TrailingBytes(buf.len()));
    }
    Ok(envelope)
}

/// Recover the signer of a decoded envelope.
pub fn sender(envelope: &TxEnvelope) -> Result<Address, TxDecodeError> {
    envelope
        .recover_signer()
        .map_err(|e| TxDecodeError::Sender(e.to_string()))
}

/// Decode an unsigned legacy transaction.
///
/// Accepts the six-field form `[nonce, gasPrice, gas, to, value, data]` and
/// the nine-field form with placeholder `v, r, s`, which are ignored. The
/// returned transaction is bound to `chain_id` so its signing hash follows
/// EIP-155.
pub fn decode_unsigned_legacy(raw: &[u8], chain_id: u64) -> Result<TxLegacy, TxDecodeError> {
    let mut buf = raw;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(TxDecodeError::NotAList);
    }
    let payload_start = buf.len();

    let nonce = u64::decode(&mut buf)?;
    let gas_price = u128::decode(&mut buf)?;
    let gas_limit = u64::decode(&mut buf)?;
    let to = TxKind::decode(&mut buf)?;
    let value = U256::decode(&mut buf)?;
    let input = Bytes::decode(&mut buf)?;

    if payload_start - buf.len() < header.payload_length {
        // v, r, s placeholders
        for _ in 0..3 {
            U256::decode(&mut buf)?;
        }
    }

    let consumed = payload_start - buf.len();
    if consumed != header.payload_length {
        return Err(TxDecodeError::Rlp(alloy::rlp::Error::ListLengthMismatch {
            expected: header.payload_length,
            got: consumed,
        }));
    }
    if !buf.is_empty() {
        return Err(TxDecodeError::TrailingBytes(buf.len()));
    }

    Ok(TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        input,
    })
}

/// Encode the six-field unsigned form understood by
/// [`decode_unsigned_legacy`].
pub fn encode_unsigned_legacy(tx: &TxLegacy) -> Vec<u8> {
    let payload_length = tx.nonce.length()
        + tx.gas_price.length()
        + tx.gas_limit.length()
        + tx.to.length()
        + tx.value.length()
        + tx.input.length();

    let mut out = Vec::with_capacity(payload_length + 4);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    tx.nonce.encode(&mut out);
    tx.gas_price.encode(&mut out);
    tx.gas_limit.encode(&mut out);
    tx.to.encode(&mut out);
    tx.value.encode(&mut out);
    tx.input.encode(&mut out);
    out
}

/// Build an unsigned value transfer.
pub fn build_transfer(
    chain_id: u64,
    nonce: u64,
    to: Address,
    value: U256,
    gas_limit: u64,
    gas_price: u128,
) -> TxLegacy {
    TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to: TxKind::Call(to),
        value,
        input: Bytes::new(),
    }
}

/// EIP-155 signing hash of an unsigned legacy transaction.
pub fn signing_hash(tx: &TxLegacy) -> B256 {
    tx.signature_hash()
}

/// Combine an unsigned transaction with its signature.
pub fn attach_signature(tx: TxLegacy, signature: Signature) -> TxEnvelope {
    TxEnvelope::Legacy(tx.into_signed(signature))
}

/// EIP-155 chain id of a signed envelope, `None` for unprotected legacy.
pub fn envelope_chain_id(envelope: &TxEnvelope) -> Option<u64> {
    envelope.chain_id()
}
