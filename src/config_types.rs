use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::Url;

/// Numeric chain identifier. Encoded as a decimal string when used as a `networks` key.
pub type ChainId = u64;

/// Unrecognised sibling properties of one object, kept verbatim.
pub type Extensions = Map<String, Value>;

/// Top-level configuration document.
///
/// ```JSON
/// {
///     "version": "1.0.0",
///     "timestamp": "2024-01-01T00:00:00Z",
///     "summary": "Registry deployments",
///     "abiRoot": "https://example.com/abis/",
///     "networks": { "1": { ... }, "11155111": { ... } }
/// }
/// ```
///
/// Built by [`crate::validate`]; there is no unchecked `Deserialize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub version: String,
    pub timestamp: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub abi_root: Option<String>,
    pub networks: BTreeMap<ChainId, NetworkConfig>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub name: String,
    pub testnet: bool,
    pub native_currency: NativeCurrencyConfig,
    pub relations: RelationsConfig,
    /// `None` entries are declared-but-absent endpoints.
    pub rpcs: BTreeMap<String, Option<RpcConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorers: Option<BTreeMap<String, Option<ExplorerConfig>>>,
    pub contracts: BTreeMap<String, Option<ContractConfig>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeCurrencyConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u64,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationsConfig {
    /// Always `None` on a mainnet.
    pub mainnet_chain_id: Option<ChainId>,
    pub parent_chain_id: Option<ChainId>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcConfig {
    pub url: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Explorer links are `root` joined with a template such as `/tx/:tx`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerConfig {
    pub root: String,
    pub block: Option<String>,
    pub address: Option<String>,
    pub tx: Option<String>,
    pub nft: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractConfig {
    pub address: String,
    pub abi_url: Option<String>,
    pub block_created: u64,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Configuration {
    pub fn network(&self, chain_id: ChainId) -> Option<&NetworkConfig> {
        self.networks.get(&chain_id)
    }

    /// Contract names shared by every network, sorted.
    pub fn contract_names(&self) -> Vec<&str> {
        self.networks
            .values()
            .next()
            .map(|network| network.contracts.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Where to fetch the ABI of `contract` on `chain_id`, if one is published.
    pub fn abi_url(&self, chain_id: ChainId, contract: &str) -> Option<Url> {
        self.network(chain_id)?
            .contract(contract)?
            .abi_location(self.abi_root.as_deref())
    }

    pub fn parsed_version(&self) -> Result<semver::Version, semver::Error> {
        semver::Version::parse(&self.version)
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp)
    }
}

impl NetworkConfig {
    /// `None` both for unknown names and for names declared as `null`.
    pub fn contract(&self, name: &str) -> Option<&ContractConfig> {
        self.contracts.get(name)?.as_ref()
    }

    pub fn rpc(&self, name: &str) -> Option<&RpcConfig> {
        self.rpcs.get(name)?.as_ref()
    }

    pub fn explorer(&self, name: &str) -> Option<&ExplorerConfig> {
        self.explorers.as_ref()?.get(name)?.as_ref()
    }

    pub fn is_mainnet(&self) -> bool {
        !self.testnet
    }
}

impl ContractConfig {
    /// Absolute `abiUrl` values are returned unchanged; relative ones are joined onto `abi_root`.
    pub fn abi_location(&self, abi_root: Option<&str>) -> Option<Url> {
        let abi_url = self.abi_url.as_deref()?;
        match Url::parse(abi_url) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => join_under(abi_root?, abi_url),
            Err(_) => None,
        }
    }
}

impl ExplorerConfig {
    pub fn block_link(&self, block: u64) -> Option<Url> {
        self.link(self.block.as_deref(), &[(":block", block.to_string().as_str())])
    }

    pub fn address_link(&self, address: &str) -> Option<Url> {
        self.link(self.address.as_deref(), &[(":address", address)])
    }

    pub fn tx_link(&self, tx_hash: &str) -> Option<Url> {
        self.link(self.tx.as_deref(), &[(":tx", tx_hash)])
    }

    pub fn nft_link(&self, address: &str, token_id: &str) -> Option<Url> {
        self.link(
            self.nft.as_deref(),
            &[(":address", address), (":token", token_id)],
        )
    }

    fn link(&self, template: Option<&str>, substitutions: &[(&str, &str)]) -> Option<Url> {
        let mut relative = template?.to_owned();
        for (token, value) in substitutions {
            relative = relative.replace(*token, value);
        }
        join_under(&self.root, &relative)
    }
}

/// RFC 3339 date-time, an offset-less date-time taken as UTC, or a bare
/// `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp);
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(local.and_utc().fixed_offset());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

/// Joins `relative` below `root`, treating `root` as a directory even without a trailing slash.
fn join_under(root: &str, relative: &str) -> Option<Url> {
    let mut base = Url::parse(root).ok()?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(relative.trim_start_matches('/')).ok()
}
