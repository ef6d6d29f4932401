use crate::properties::strategies::{LAYERS, base_document, extensions_strategy, layer_mut};

use chain_config::{load_str, to_string_pretty, to_value, validate};
use proptest::{prelude::*, test_runner::Config};

proptest! {
    #![proptest_config(Config {
        failure_persistence: None,
        ..Config::default()
    })]

    #[test]
    fn test_roundtrip_preserves_extensions_at_every_layer(
        extensions in prop::collection::vec(extensions_strategy(), LAYERS.len())
    ) {
        let mut document = base_document();
        for (layer, properties) in LAYERS.iter().zip(&extensions) {
            layer_mut(&mut document, layer).extend(properties.clone());
        }

        let config = validate(&document).unwrap();
        let encoded = to_value(&config).unwrap();
        prop_assert_eq!(&encoded, &document);

        let revalidated = validate(&encoded).unwrap();
        prop_assert_eq!(&revalidated, &config);

        let mainnet = config.network(1).unwrap();
        prop_assert_eq!(&config.extensions, &extensions[0]);
        prop_assert_eq!(&mainnet.extensions, &extensions[1]);
        prop_assert_eq!(&mainnet.native_currency.extensions, &extensions[2]);
        prop_assert_eq!(&mainnet.relations.extensions, &extensions[3]);
        prop_assert_eq!(&mainnet.rpc("public").unwrap().extensions, &extensions[4]);
        prop_assert_eq!(&mainnet.explorer("etherscan").unwrap().extensions, &extensions[5]);
        prop_assert_eq!(&mainnet.contract("Registry").unwrap().extensions, &extensions[6]);
    }

    #[test]
    fn test_pretty_text_reloads_identically(
        extensions in extensions_strategy()
    ) {
        let mut document = base_document();
        layer_mut(&mut document, &["networks", "1", "rpcs", "public"]).extend(extensions);

        let config = validate(&document).unwrap();
        let text = to_string_pretty(&config).unwrap();
        let reloaded = load_str(&text).unwrap();
        prop_assert_eq!(reloaded, config);
    }
}
