//! The transfer record carried through every lifecycle stage.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::primitives::{Address, Bytes, TxHash, U256, U64};
use serde::{Deserialize, Serialize};

/// A relayed transaction as subscribers see it.
///
/// `to == None` marks a contract creation. Quantities serialize as hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub hash: TxHash,
    #[serde(default)]
    pub data: Bytes,
    /// Set only on the record published with a `Confirmed` event.
    #[serde(default)]
    pub block_number: Option<U64>,
}

impl TransferRecord {
    pub fn from_envelope(envelope: &TxEnvelope, from: Address) -> Self {
        Self {
            from,
            to: envelope.to(),
            value: envelope.value(),
            hash: *envelope.tx_hash(),
            data: envelope.input().clone(),
            block_number: None,
        }
    }

    /// Copy of this record stamped with the block it was mined in.
    pub fn mined_in(&self, block_number: Option<u64>) -> Self {
        Self {
            block_number: block_number.map(U64::from),
            ..self.clone()
        }
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn sample() -> TransferRecord {
        TransferRecord {
            from: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            to: Some(address!("abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd")),
            value: U256::from(1000),
            hash: TxHash::repeat_byte(0x11),
            data: Bytes::new(),
            block_number: None,
        }
    }

    #[test]
    fn test_json_uses_hex_quantities() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["value"], "0x3e8");
        assert_eq!(json["data"], "0x");
        assert!(json["blockNumber"].is_null());
        assert_eq!(
            json["hash"],
            "0x1111111111111111111111111111111111111111111111111111111111111111"
        );
    }

    #[test]
    fn test_mined_in_sets_block_number() {
        let mined = sample().mined_in(Some(42));
        let json = serde_json::to_value(&mined).unwrap();
        assert_eq!(json["blockNumber"], "0x2a");
        assert_eq!(mined.hash, sample().hash);
    }

    #[test]
    fn test_contract_creation_serializes_null_to() {
        let mut record = sample();
        record.to = None;
        assert!(record.is_contract_creation());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["to"].is_null());

        let back: TransferRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
