//! Extension preservation.
//!
//! Unknown properties ride along in each object's `extensions` map. This
//! module covers the two places where an extension could shadow a standard
//! field: a key repeated inside one JSON object on the way in, and an
//! extension-map entry named like a standard field on the way out.

use crate::config_error::{ConfigError, ErrorKind, JsonPath, ValidationError, ValidationErrors};
use crate::config_schema::{ObjectType, is_standard_field};
use crate::config_types::{
    Configuration, ContractConfig, ExplorerConfig, Extensions, NativeCurrencyConfig,
    NetworkConfig, RelationsConfig, RpcConfig,
};
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// A JSON document plus every key that appeared more than once in the same object.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub duplicates: BTreeSet<JsonPath>,
}

impl From<Value> for Decoded {
    fn from(value: Value) -> Self {
        Self {
            value,
            duplicates: BTreeSet::new(),
        }
    }
}

pub fn decode_slice(bytes: &[u8]) -> Result<Decoded, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut duplicates = BTreeSet::new();
    let value = TrackingSeed {
        path: JsonPath::root(),
        duplicates: &mut duplicates,
    }
    .deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(Decoded { value, duplicates })
}

pub fn decode_str(json: &str) -> Result<Decoded, serde_json::Error> {
    decode_slice(json.as_bytes())
}

/// Builds a `serde_json::Value` like `Value::deserialize` does (last duplicate wins),
/// recording the path of each repeated key.
struct TrackingSeed<'a> {
    path: JsonPath,
    duplicates: &'a mut BTreeSet<JsonPath>,
}

impl<'de> DeserializeSeed<'de> for TrackingSeed<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for TrackingSeed<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        DeserializeSeed::deserialize(self, deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(TrackingSeed {
            path: self.path.child(items.len().to_string()),
            duplicates: &mut *self.duplicates,
        })? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            let path = self.path.child(key.as_str());
            let value = access.next_value_seed(TrackingSeed {
                path: path.clone(),
                duplicates: &mut *self.duplicates,
            })?;
            if object.insert(key, value).is_some() {
                self.duplicates.insert(path);
            }
        }
        Ok(Value::Object(object))
    }
}

/// Encodes standard fields and extension maps back into one JSON object per layer.
pub fn to_value(config: &Configuration) -> Result<Value, ConfigError> {
    check_reserved_keys(config)?;
    Ok(serde_json::to_value(config)?)
}

pub fn to_string_pretty(config: &Configuration) -> Result<String, ConfigError> {
    check_reserved_keys(config)?;
    Ok(serde_json::to_string_pretty(config)?)
}

/// Rejects extension entries that would overwrite a standard field when merged back.
pub fn check_reserved_keys(config: &Configuration) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    let root = JsonPath::root();
    reserved_in(&mut errors, &root, config);

    let networks = root.child("networks");
    for (chain_id, network) in &config.networks {
        let network_path = networks.child(chain_id.to_string());
        reserved_in(&mut errors, &network_path, network);
        reserved_in(
            &mut errors,
            &network_path.child("nativeCurrency"),
            &network.native_currency,
        );
        reserved_in(&mut errors, &network_path.child("relations"), &network.relations);
        entries_in(&mut errors, &network_path.child("rpcs"), &network.rpcs);
        if let Some(explorers) = &network.explorers {
            entries_in(&mut errors, &network_path.child("explorers"), explorers);
        }
        entries_in(&mut errors, &network_path.child("contracts"), &network.contracts);
    }

    match ValidationErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

fn entries_in<'a, T, I>(errors: &mut Vec<ValidationError>, path: &JsonPath, entries: I)
where
    T: Extensible + 'a,
    I: IntoIterator<Item = (&'a String, &'a Option<T>)>,
{
    for (name, entry) in entries {
        if let Some(entry) = entry {
            reserved_in(errors, &path.child(name.as_str()), entry);
        }
    }
}

fn reserved_in<T: Extensible>(errors: &mut Vec<ValidationError>, path: &JsonPath, object: &T) {
    for key in object.extensions().keys() {
        if is_standard_field(T::OBJECT, key) {
            errors.push(ValidationError::new(
                path.child(key.as_str()),
                ErrorKind::ReservedKeyConflict,
                format!("extension property `{}` shadows a standard {} field", key, T::OBJECT),
            ));
        }
    }
}

/// An object layer that carries an extension map.
pub trait Extensible {
    const OBJECT: ObjectType;

    fn extensions(&self) -> &Extensions;
}

macro_rules! extensible {
    ($($ty:ty => $object:expr),* $(,)?) => {
        $(
            impl Extensible for $ty {
                const OBJECT: ObjectType = $object;

                fn extensions(&self) -> &Extensions {
                    &self.extensions
                }
            }
        )*
    };
}

extensible! {
    Configuration => ObjectType::Configuration,
    NetworkConfig => ObjectType::Network,
    NativeCurrencyConfig => ObjectType::NativeCurrency,
    RelationsConfig => ObjectType::Relations,
    RpcConfig => ObjectType::Rpc,
    ExplorerConfig => ObjectType::Explorer,
    ContractConfig => ObjectType::Contract,
}
