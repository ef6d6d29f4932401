use crate::properties::strategies::base_document;

use chain_config::{ErrorKind, validate};
use proptest::{prelude::*, test_runner::Config};
use serde_json::json;

proptest! {
    #![proptest_config(Config {
        failure_persistence: None,
        ..Config::default()
    })]

    #[test]
    fn test_any_block_number_accepted(block in any::<u64>()) {
        let mut document = base_document();
        document["networks"]["1"]["contracts"]["Registry"]["blockCreated"] = json!(block);
        let config = validate(&document).unwrap();
        prop_assert_eq!(
            config.network(1).unwrap().contract("Registry").unwrap().block_created,
            block
        );
    }

    #[test]
    fn test_block_number_strings_rejected(block in any::<u32>(), hex in any::<bool>()) {
        let text = if hex { format!("{:#x}", block) } else { block.to_string() };
        let mut document = base_document();
        document["networks"]["1"]["contracts"]["Registry"]["blockCreated"] = json!(text);

        let errors = validate(&document).unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        prop_assert_eq!(error.kind, ErrorKind::TypeMismatch);
        prop_assert_eq!(
            error.path.to_string(),
            "networks.1.contracts.Registry.blockCreated"
        );
    }

    #[test]
    fn test_negative_decimals_rejected(decimals in i64::MIN..0) {
        let mut document = base_document();
        document["networks"]["10"]["nativeCurrency"]["decimals"] = json!(decimals);

        let errors = validate(&document).unwrap_err();
        prop_assert_eq!(errors.kinds(), vec![ErrorKind::TypeMismatch]);
    }
}
