use proptest::prelude::*;
use serde_json::{Map, Value, json};

const MAX_EXTENSIONS: usize = 4;

pub const REGISTRY: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Layers of a document that can carry extension properties.
pub const LAYERS: [&[&str]; 7] = [
    &[],
    &["networks", "1"],
    &["networks", "1", "nativeCurrency"],
    &["networks", "1", "relations"],
    &["networks", "1", "rpcs", "public"],
    &["networks", "1", "explorers", "etherscan"],
    &["networks", "1", "contracts", "Registry"],
];

/// A valid document that spells out every optional field, so encoding reproduces it exactly.
pub fn base_document() -> Value {
    json!({
        "version": "2.1.0",
        "timestamp": "2024-06-01T08:00:00Z",
        "summary": "Registry deployments",
        "description": "Contracts of the registry protocol",
        "abiRoot": "https://example.com/abis/",
        "networks": {
            "1": {
                "name": "Ethereum",
                "testnet": false,
                "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 },
                "relations": { "mainnetChainId": null, "parentChainId": null },
                "rpcs": { "public": { "url": "https://eth.example" }, "private": null },
                "explorers": {
                    "etherscan": {
                        "root": "https://etherscan.io",
                        "block": "/block/:block",
                        "address": "/address/:address",
                        "tx": "/tx/:tx",
                        "nft": "/nft/:address/:token"
                    }
                },
                "contracts": {
                    "Registry": {
                        "address": REGISTRY,
                        "abiUrl": "Registry.json",
                        "blockCreated": 1234567
                    }
                }
            },
            "10": {
                "name": "Optimism",
                "testnet": false,
                "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 },
                "relations": { "mainnetChainId": null, "parentChainId": 1 },
                "rpcs": { "public": { "url": "https://op.example" } },
                "explorers": { "etherscan": null },
                "contracts": { "Registry": null }
            }
        }
    })
}

pub fn layer_mut<'a>(document: &'a mut Value, layer: &[&str]) -> &'a mut Map<String, Value> {
    let mut target = document;
    for segment in layer {
        target = &mut target[*segment];
    }
    target.as_object_mut().expect("layer is an object")
}

pub fn extension_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 :/._-]{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z]{1,6}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Extension properties for one layer. Keys never collide with standard field names.
pub fn extensions_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("x-[a-z]{1,8}", extension_value_strategy(), 0..MAX_EXTENSIONS)
        .prop_map(|entries| entries.into_iter().collect())
}
