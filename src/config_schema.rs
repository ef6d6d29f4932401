use serde_json::Value;
use std::fmt;

/// Every object layer of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Configuration,
    Network,
    NativeCurrency,
    Relations,
    Rpc,
    Explorer,
    Contract,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Network => "network",
            Self::NativeCurrency => "native currency",
            Self::Relations => "relations",
            Self::Rpc => "rpc",
            Self::Explorer => "explorer",
            Self::Contract => "contract",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Bool,
    /// JSON integer in `0..=u64::MAX`. Strings never qualify, hex or not.
    UnsignedInteger,
    Object(ObjectType),
    /// Object whose values are each an `ObjectType` object or `null`.
    Mapping(ObjectType),
}

impl ValueKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::UnsignedInteger => value.is_u64(),
            Self::Object(_) | Self::Mapping(_) => value.is_object(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("a string"),
            Self::Bool => f.write_str("a boolean"),
            Self::UnsignedInteger => f.write_str("a non-negative integer"),
            Self::Object(object) => write!(f, "a {} object", object),
            Self::Mapping(object) => write!(f, "a mapping of {} objects", object),
        }
    }
}

/// Short name of the JSON kind actually found, for diagnostics.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_u64() => "a non-negative integer",
        Value::Number(n) if n.is_i64() => "a negative integer",
        Value::Number(_) => "a fractional number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub nullable: bool,
    pub kind: ValueKind,
}

const fn required(name: &'static str, kind: ValueKind) -> FieldSpec {
    FieldSpec {
        name,
        required: true,
        nullable: false,
        kind,
    }
}

const fn optional(name: &'static str, kind: ValueKind) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
        nullable: false,
        kind,
    }
}

const fn nullable(name: &'static str, required: bool, kind: ValueKind) -> FieldSpec {
    FieldSpec {
        name,
        required,
        nullable: true,
        kind,
    }
}

static CONFIGURATION_FIELDS: &[FieldSpec] = &[
    required("version", ValueKind::String),
    required("timestamp", ValueKind::String),
    required("summary", ValueKind::String),
    optional("description", ValueKind::String),
    nullable("abiRoot", true, ValueKind::String),
    required("networks", ValueKind::Mapping(ObjectType::Network)),
];

static NETWORK_FIELDS: &[FieldSpec] = &[
    required("name", ValueKind::String),
    required("testnet", ValueKind::Bool),
    required("nativeCurrency", ValueKind::Object(ObjectType::NativeCurrency)),
    required("relations", ValueKind::Object(ObjectType::Relations)),
    required("rpcs", ValueKind::Mapping(ObjectType::Rpc)),
    optional("explorers", ValueKind::Mapping(ObjectType::Explorer)),
    required("contracts", ValueKind::Mapping(ObjectType::Contract)),
];

static NATIVE_CURRENCY_FIELDS: &[FieldSpec] = &[
    required("name", ValueKind::String),
    required("symbol", ValueKind::String),
    required("decimals", ValueKind::UnsignedInteger),
];

static RELATIONS_FIELDS: &[FieldSpec] = &[
    nullable("mainnetChainId", false, ValueKind::UnsignedInteger),
    nullable("parentChainId", false, ValueKind::UnsignedInteger),
];

static RPC_FIELDS: &[FieldSpec] = &[required("url", ValueKind::String)];

static EXPLORER_FIELDS: &[FieldSpec] = &[
    required("root", ValueKind::String),
    nullable("block", false, ValueKind::String),
    nullable("address", false, ValueKind::String),
    nullable("tx", false, ValueKind::String),
    nullable("nft", false, ValueKind::String),
];

static CONTRACT_FIELDS: &[FieldSpec] = &[
    required("address", ValueKind::String),
    nullable("abiUrl", false, ValueKind::String),
    required("blockCreated", ValueKind::UnsignedInteger),
];

/// Standard fields of an object layer, in document order.
pub fn fields(object: ObjectType) -> &'static [FieldSpec] {
    match object {
        ObjectType::Configuration => CONFIGURATION_FIELDS,
        ObjectType::Network => NETWORK_FIELDS,
        ObjectType::NativeCurrency => NATIVE_CURRENCY_FIELDS,
        ObjectType::Relations => RELATIONS_FIELDS,
        ObjectType::Rpc => RPC_FIELDS,
        ObjectType::Explorer => EXPLORER_FIELDS,
        ObjectType::Contract => CONTRACT_FIELDS,
    }
}

/// `None` means `key` is an extension property at this layer.
pub fn field_spec(object: ObjectType, key: &str) -> Option<FieldSpec> {
    fields(object).iter().find(|spec| spec.name == key).copied()
}

pub fn is_standard_field(object: ObjectType, key: &str) -> bool {
    field_spec(object, key).is_some()
}
