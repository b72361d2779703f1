//! Notification topic naming.
//!
//! Contract creations share `<prefix>/ContractCreate`; transfers go to
//! `<prefix>/<recipient hex, lowercase, no 0x>/<marker>`.

use alloy::primitives::Address;

pub const CONTRACT_CREATE: &str = "ContractCreate";

pub fn topic_for(prefix: &str, to: Option<Address>, marker: i8) -> String {
    match to {
        None => format!("{prefix}/{CONTRACT_CREATE}"),
        Some(to) => format!("{prefix}/{}/{marker}", alloy::hex::encode(to.as_slice())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_transfer_topic_is_lowercase_without_prefix() {
        let to = address!("ABCDabcdABCDabcdABCDabcdABCDabcdABCDabcd");
        assert_eq!(
            topic_for("newchain/tx", Some(to), -1),
            "newchain/tx/abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd/-1"
        );
        assert_eq!(
            topic_for("p", Some(to), 1),
            "p/abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd/1"
        );
    }

    #[test]
    fn test_contract_creation_ignores_marker() {
        for marker in [-1, 0, 1] {
            assert_eq!(topic_for("p", None, marker), "p/ContractCreate");
        }
    }
}
