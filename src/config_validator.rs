use crate::config_error::{ErrorKind, JsonPath, ValidationError, ValidationErrors};
use crate::config_extensions::Decoded;
use crate::config_schema::{FieldSpec, ObjectType, ValueKind, describe, field_spec};
use crate::config_types::{
    ChainId, Configuration, ContractConfig, ExplorerConfig, Extensions, NativeCurrencyConfig,
    NetworkConfig, RelationsConfig, RpcConfig, parse_timestamp,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use url::Url;

/// Validates a decoded document, collecting every structural and invariant error.
pub fn validate(raw: &Value) -> Result<Configuration, ValidationErrors> {
    Validator::new(&BTreeSet::new()).run(raw)
}

/// Like [`validate`], additionally reporting standard keys repeated in one object.
pub fn validate_decoded(decoded: &Decoded) -> Result<Configuration, ValidationErrors> {
    Validator::new(&decoded.duplicates).run(&decoded.value)
}

/// Outcome of looking up one standard field.
enum Lookup<'a> {
    /// Present and of the declared kind.
    Value(&'a Value),
    /// Absent optional field, or `null` where allowed.
    Empty,
    /// Error already recorded.
    Invalid,
}

/// One object layer being read.
struct Layer<'a> {
    object: ObjectType,
    path: JsonPath,
    map: &'a Map<String, Value>,
}

struct Validator<'d> {
    duplicates: &'d BTreeSet<JsonPath>,
    errors: Vec<ValidationError>,
}

impl<'d> Validator<'d> {
    fn new(duplicates: &'d BTreeSet<JsonPath>) -> Self {
        Self {
            duplicates,
            errors: Vec::new(),
        }
    }

    fn run(mut self, raw: &Value) -> Result<Configuration, ValidationErrors> {
        let config = self.configuration(raw);

        if let Some(config) = &config {
            if self.errors.is_empty() {
                self.check_invariants(config);
            }
        }

        match (config, ValidationErrors::from_vec(self.errors)) {
            (Some(config), None) => {
                debug!(
                    networks = config.networks.len(),
                    version = %config.version,
                    "configuration validated"
                );
                Ok(config)
            }
            (_, Some(errors)) => {
                debug!(count = errors.len(), "configuration rejected");
                Err(errors)
            }
            // Unreachable in practice: every missing object records an error.
            (None, None) => Err(ValidationErrors::single(ValidationError::new(
                JsonPath::root(),
                ErrorKind::TypeMismatch,
                "document could not be read",
            ))),
        }
    }

    fn report(&mut self, path: JsonPath, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path, kind, message));
    }

    fn layer<'a>(
        &mut self,
        object: ObjectType,
        path: JsonPath,
        raw: &'a Value,
    ) -> Option<Layer<'a>> {
        let Some(map) = raw.as_object() else {
            self.report(
                path,
                ErrorKind::TypeMismatch,
                format!("expected a {} object, found {}", object, describe(raw)),
            );
            return None;
        };
        Some(Layer { object, path, map })
    }

    fn lookup<'a>(&mut self, layer: &Layer<'a>, key: &str) -> Lookup<'a> {
        let Some(spec) = field_spec(layer.object, key) else {
            return Lookup::Empty;
        };
        let path = layer.path.child(key);

        if self.duplicates.contains(&path) {
            self.report(
                path,
                ErrorKind::ReservedKeyConflict,
                format!(
                    "`{}` is defined more than once; extensions may not override standard fields",
                    key
                ),
            );
            return Lookup::Invalid;
        }

        match layer.map.get(key) {
            None if spec.required => {
                self.report(
                    path,
                    ErrorKind::MissingField,
                    format!("required field `{}` is absent", key),
                );
                Lookup::Invalid
            }
            None => Lookup::Empty,
            Some(Value::Null) if spec.nullable => Lookup::Empty,
            Some(value) if spec.kind.matches(value) => Lookup::Value(value),
            Some(value) => {
                self.report(path, ErrorKind::TypeMismatch, mismatch(&spec, value));
                Lookup::Invalid
            }
        }
    }

    /// `None` on error, `Some(None)` when empty.
    fn string(&mut self, layer: &Layer<'_>, key: &str) -> Option<Option<String>> {
        match self.lookup(layer, key) {
            Lookup::Value(value) => Some(value.as_str().map(str::to_owned)),
            Lookup::Empty => Some(None),
            Lookup::Invalid => None,
        }
    }

    fn required_string(&mut self, layer: &Layer<'_>, key: &str) -> Option<String> {
        self.string(layer, key).flatten()
    }

    fn unsigned(&mut self, layer: &Layer<'_>, key: &str) -> Option<Option<u64>> {
        match self.lookup(layer, key) {
            Lookup::Value(value) => Some(value.as_u64()),
            Lookup::Empty => Some(None),
            Lookup::Invalid => None,
        }
    }

    fn required_unsigned(&mut self, layer: &Layer<'_>, key: &str) -> Option<u64> {
        self.unsigned(layer, key).flatten()
    }

    fn required_bool(&mut self, layer: &Layer<'_>, key: &str) -> Option<bool> {
        match self.lookup(layer, key) {
            Lookup::Value(value) => value.as_bool(),
            Lookup::Empty | Lookup::Invalid => None,
        }
    }

    fn nested<'a, T>(
        &mut self,
        layer: &Layer<'a>,
        key: &str,
        read: impl FnOnce(&mut Self, JsonPath, &'a Value) -> Option<T>,
    ) -> Option<T> {
        match self.lookup(layer, key) {
            Lookup::Value(value) => read(self, layer.path.child(key), value),
            Lookup::Empty | Lookup::Invalid => None,
        }
    }

    /// Reads a name → object-or-null mapping. `Some(None)` when the optional mapping is absent.
    fn mapping<'a, T>(
        &mut self,
        layer: &Layer<'a>,
        key: &str,
        mut read: impl FnMut(&mut Self, JsonPath, &'a Value) -> Option<T>,
    ) -> Option<Option<BTreeMap<String, Option<T>>>> {
        let raw = match self.lookup(layer, key) {
            Lookup::Value(Value::Object(raw)) => raw,
            Lookup::Empty => return Some(None),
            _ => return None,
        };
        let path = layer.path.child(key);

        let mut entries = BTreeMap::new();
        let mut complete = true;
        for (name, value) in raw {
            let entry_path = path.child(name.as_str());
            if self.duplicates.contains(&entry_path) {
                self.report(
                    entry_path,
                    ErrorKind::InvalidValue,
                    format!("`{}` is declared more than once in `{}`", name, key),
                );
                complete = false;
                continue;
            }
            if value.is_null() {
                entries.insert(name.clone(), None);
                continue;
            }
            match read(self, entry_path, value) {
                Some(entry) => {
                    entries.insert(name.clone(), Some(entry));
                }
                None => complete = false,
            }
        }
        complete.then_some(Some(entries))
    }

    fn required_mapping<'a, T>(
        &mut self,
        layer: &Layer<'a>,
        key: &str,
        read: impl FnMut(&mut Self, JsonPath, &'a Value) -> Option<T>,
    ) -> Option<BTreeMap<String, Option<T>>> {
        self.mapping(layer, key, read).flatten()
    }

    /// Copies every non-standard key verbatim.
    fn extensions(&mut self, layer: &Layer<'_>) -> Extensions {
        let mut extensions = Extensions::new();
        for (key, value) in layer.map {
            if field_spec(layer.object, key).is_some() {
                continue;
            }
            let path = layer.path.child(key.as_str());
            if self.duplicates.contains(&path) {
                warn!(path = %path, "extension property repeated; keeping the last value");
            }
            extensions.insert(key.clone(), value.clone());
        }
        extensions
    }

    fn configuration(&mut self, raw: &Value) -> Option<Configuration> {
        let layer = self.layer(ObjectType::Configuration, JsonPath::root(), raw)?;

        let version = self.required_string(&layer, "version");
        if let Some(version) = &version {
            if let Err(err) = semver::Version::parse(version) {
                self.report(
                    layer.path.child("version"),
                    ErrorKind::InvalidValue,
                    format!("`{}` is not a semantic version: {}", version, err),
                );
            }
        }

        let timestamp = self.required_string(&layer, "timestamp");
        if let Some(timestamp) = &timestamp {
            if parse_timestamp(timestamp).is_none() {
                self.report(
                    layer.path.child("timestamp"),
                    ErrorKind::InvalidValue,
                    format!("`{}` is not an ISO-8601 timestamp", timestamp),
                );
            }
        }

        let summary = self.required_string(&layer, "summary");
        let description = self.string(&layer, "description");

        let abi_root = self.string(&layer, "abiRoot");
        if let Some(Some(root)) = &abi_root {
            self.absolute_url(layer.path.child("abiRoot"), root);
        }

        let networks = self.networks(&layer);
        let extensions = self.extensions(&layer);

        Some(Configuration {
            version: version?,
            timestamp: timestamp?,
            summary: summary?,
            description: description?,
            abi_root: abi_root?,
            networks: networks?,
            extensions,
        })
    }

    fn networks(&mut self, layer: &Layer<'_>) -> Option<BTreeMap<ChainId, NetworkConfig>> {
        let raw = match self.lookup(layer, "networks") {
            Lookup::Value(Value::Object(raw)) => raw,
            _ => return None,
        };
        let path = layer.path.child("networks");

        let mut networks = BTreeMap::new();
        let mut complete = true;
        for (key, value) in raw {
            let network_path = path.child(key.as_str());
            if self.duplicates.contains(&network_path) {
                self.report(
                    network_path,
                    ErrorKind::InvalidValue,
                    format!("chain id `{}` is declared more than once", key),
                );
                complete = false;
                continue;
            }
            let chain_id = parse_chain_id(key);
            if chain_id.is_none() {
                self.report(
                    network_path.clone(),
                    ErrorKind::InvalidValue,
                    format!("network key `{}` is not a decimal chain id", key),
                );
            }
            let network = self.network(network_path, value);
            match (chain_id, network) {
                (Some(chain_id), Some(network)) => {
                    networks.insert(chain_id, network);
                }
                _ => complete = false,
            }
        }
        complete.then_some(networks)
    }

    fn network(&mut self, path: JsonPath, raw: &Value) -> Option<NetworkConfig> {
        let layer = self.layer(ObjectType::Network, path, raw)?;

        let name = self.required_string(&layer, "name");
        let testnet = self.required_bool(&layer, "testnet");
        let native_currency = self.nested(&layer, "nativeCurrency", Self::native_currency);
        let relations = self.nested(&layer, "relations", Self::relations);
        let rpcs = self.required_mapping(&layer, "rpcs", Self::rpc);
        let explorers = self.mapping(&layer, "explorers", Self::explorer);
        let contracts = self.required_mapping(&layer, "contracts", Self::contract);
        let extensions = self.extensions(&layer);

        Some(NetworkConfig {
            name: name?,
            testnet: testnet?,
            native_currency: native_currency?,
            relations: relations?,
            rpcs: rpcs?,
            explorers: explorers?,
            contracts: contracts?,
            extensions,
        })
    }

    fn native_currency(&mut self, path: JsonPath, raw: &Value) -> Option<NativeCurrencyConfig> {
        let layer = self.layer(ObjectType::NativeCurrency, path, raw)?;

        let name = self.required_string(&layer, "name");
        let symbol = self.required_string(&layer, "symbol");
        let decimals = self.required_unsigned(&layer, "decimals");
        let extensions = self.extensions(&layer);

        Some(NativeCurrencyConfig {
            name: name?,
            symbol: symbol?,
            decimals: decimals?,
            extensions,
        })
    }

    fn relations(&mut self, path: JsonPath, raw: &Value) -> Option<RelationsConfig> {
        let layer = self.layer(ObjectType::Relations, path, raw)?;

        let mainnet_chain_id = self.unsigned(&layer, "mainnetChainId");
        let parent_chain_id = self.unsigned(&layer, "parentChainId");
        let extensions = self.extensions(&layer);

        Some(RelationsConfig {
            mainnet_chain_id: mainnet_chain_id?,
            parent_chain_id: parent_chain_id?,
            extensions,
        })
    }

    fn rpc(&mut self, path: JsonPath, raw: &Value) -> Option<RpcConfig> {
        let layer = self.layer(ObjectType::Rpc, path, raw)?;

        let url = self.required_string(&layer, "url");
        if let Some(url) = &url {
            self.absolute_url(layer.path.child("url"), url);
        }
        let extensions = self.extensions(&layer);

        Some(RpcConfig {
            url: url?,
            extensions,
        })
    }

    fn explorer(&mut self, path: JsonPath, raw: &Value) -> Option<ExplorerConfig> {
        let layer = self.layer(ObjectType::Explorer, path, raw)?;

        let root = self.required_string(&layer, "root");
        if let Some(root) = &root {
            self.absolute_url(layer.path.child("root"), root);
        }
        let block = self.template(&layer, "block", ":block");
        let address = self.template(&layer, "address", ":address");
        let tx = self.template(&layer, "tx", ":tx");
        let nft = self.template(&layer, "nft", ":token");
        let extensions = self.extensions(&layer);

        Some(ExplorerConfig {
            root: root?,
            block: block?,
            address: address?,
            tx: tx?,
            nft: nft?,
            extensions,
        })
    }

    fn template(
        &mut self,
        layer: &Layer<'_>,
        key: &str,
        placeholder: &str,
    ) -> Option<Option<String>> {
        let template = self.string(layer, key)?;
        if let Some(template) = &template {
            if !template.contains(placeholder) {
                self.report(
                    layer.path.child(key),
                    ErrorKind::InvalidValue,
                    format!("template `{}` lacks the `{}` placeholder", template, placeholder),
                );
            }
        }
        Some(template)
    }

    fn contract(&mut self, path: JsonPath, raw: &Value) -> Option<ContractConfig> {
        let layer = self.layer(ObjectType::Contract, path, raw)?;

        let address = self.required_string(&layer, "address");
        if let Some(address) = &address {
            if !is_address(address) {
                self.report(
                    layer.path.child("address"),
                    ErrorKind::InvalidValue,
                    format!("`{}` is not a 0x-prefixed 20-byte hex address", address),
                );
            }
        }
        let abi_url = self.string(&layer, "abiUrl");
        let block_created = self.required_unsigned(&layer, "blockCreated");
        let extensions = self.extensions(&layer);

        Some(ContractConfig {
            address: address?,
            abi_url: abi_url?,
            block_created: block_created?,
            extensions,
        })
    }

    fn absolute_url(&mut self, path: JsonPath, raw: &str) {
        if let Err(err) = Url::parse(raw) {
            self.report(
                path,
                ErrorKind::InvalidValue,
                format!("`{}` is not an absolute URL: {}", raw, err),
            );
        }
    }

    fn check_invariants(&mut self, config: &Configuration) {
        let networks = JsonPath::root().child("networks");

        let reference: Option<(ChainId, BTreeSet<&str>)> =
            config.networks.iter().next().map(|(chain_id, network)| {
                (*chain_id, network.contracts.keys().map(String::as_str).collect())
            });

        for (chain_id, network) in &config.networks {
            let network_path = networks.child(chain_id.to_string());
            let names: BTreeSet<&str> = network.contracts.keys().map(String::as_str).collect();

            if let Some((reference_id, expected)) = &reference {
                if *expected != names {
                    let missing: Vec<&str> = expected.difference(&names).copied().collect();
                    let extra: Vec<&str> = names.difference(expected).copied().collect();
                    let message = format!(
                        "contract names differ from network {}: missing [{}], unexpected [{}]",
                        reference_id,
                        missing.join(", "),
                        extra.join(", ")
                    );
                    self.report(
                        network_path.child("contracts"),
                        ErrorKind::InvariantViolation,
                        message,
                    );
                }
            }

            if network.is_mainnet() {
                if let Some(mainnet) = network.relations.mainnet_chain_id {
                    self.report(
                        network_path.child("relations").child("mainnetChainId"),
                        ErrorKind::InvariantViolation,
                        format!("mainnet must not point at another mainnet (found {})", mainnet),
                    );
                }
            }

            if config.abi_root.is_none() {
                for (name, contract) in &network.contracts {
                    let Some(abi_url) = contract.as_ref().and_then(|c| c.abi_url.as_deref()) else {
                        continue;
                    };
                    if matches!(Url::parse(abi_url), Err(url::ParseError::RelativeUrlWithoutBase)) {
                        self.report(
                            network_path.child("contracts").child(name.as_str()).child("abiUrl"),
                            ErrorKind::InvariantViolation,
                            format!("relative abiUrl `{}` needs a non-null abiRoot", abi_url),
                        );
                    }
                }
            }
        }
    }
}

fn mismatch(spec: &FieldSpec, found: &Value) -> String {
    let mut message = format!(
        "`{}` must be {}, found {}",
        spec.name,
        spec.kind,
        describe(found)
    );
    if spec.kind == ValueKind::UnsignedInteger && found.is_string() {
        message.push_str(" (numbers are never read from strings)");
    }
    message
}

/// Canonical decimal only: no sign, no leading zeros, no whitespace.
fn parse_chain_id(key: &str) -> Option<ChainId> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

fn is_address(raw: &str) -> bool {
    let Some(digits) = raw.strip_prefix("0x") else {
        return false;
    };
    matches!(hex::decode(digits), Ok(bytes) if bytes.len() == 20)
}
