// Override blobs
//
// The controller carries overrides as JSON text inside an envelope:
// `{"overrides": "<json-text>"}`. Blobs are decoded here at the boundary,
// mutated as maps, and encoded again only when written back. A write
// always replaces the whole blob on the controller, so callers must start
// from a full read.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::Error;

pub const RADIO_PARAMS_BASE: &str = "radioParamsBase";
pub const LINK_PARAMS_BASE: &str = "linkParamsBase";
pub const FW_PARAMS: &str = "fwParams";
pub const TDD_SLOT_RATIO: &str = "tddSlotRatio";
pub const LA_MAX_MCS: &str = "laMaxMcs";

/// Pull the inner document out of an `{overrides: ...}` envelope.
///
/// Accepts the stringified form the wire contract uses, and a bare object
/// for controllers that skip the inner encoding. Missing, null, or empty
/// payloads decode to an empty map.
fn decode_envelope(envelope: &Value) -> Result<Map<String, Value>, Error> {
    match envelope.get("overrides") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(Map::new()),
        Some(Value::String(text)) => {
            serde_json::from_str(text).map_err(|e| Error::Deserialization {
                message: format!("override blob is not a JSON object: {e}"),
                body: text.clone(),
            })
        }
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(Error::Deserialization {
            message: "override envelope holds neither a string nor an object".into(),
            body: other.to_string(),
        }),
    }
}

fn encode_envelope(blob: &impl serde::Serialize) -> Result<Value, Error> {
    let text = serde_json::to_string(blob).map_err(|e| Error::Deserialization {
        message: format!("failed to encode override blob: {e}"),
        body: String::new(),
    })?;
    Ok(json!({ "overrides": text }))
}

/// Remove `key` as an object, or an empty object if absent or not an object.
fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    }
}

// ── Network scope ───────────────────────────────────────────────────

/// Network-wide override blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkOverrides(Map<String, Value>);

impl NetworkOverrides {
    pub fn decode(envelope: &Value) -> Result<Self, Error> {
        decode_envelope(envelope).map(Self)
    }

    pub fn encode(&self) -> Result<Value, Error> {
        encode_envelope(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tdd_slot_ratio(&self) -> Option<i64> {
        self.0
            .get(RADIO_PARAMS_BASE)?
            .get(FW_PARAMS)?
            .get(TDD_SLOT_RATIO)?
            .as_i64()
    }

    /// Set `radioParamsBase.fwParams.tddSlotRatio`.
    ///
    /// Never creates structure: both parent keys must already exist, since
    /// their absence means the blob is not shaped the way this call assumes.
    pub fn set_tdd_slot_ratio(&mut self, value: i64) -> Result<(), Error> {
        let radio = self
            .0
            .get_mut(RADIO_PARAMS_BASE)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::OverrideShape {
                path: RADIO_PARAMS_BASE.into(),
            })?;
        let fw = radio
            .get_mut(FW_PARAMS)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::OverrideShape {
                path: format!("{RADIO_PARAMS_BASE}.{FW_PARAMS}"),
            })?;
        fw.insert(TDD_SLOT_RATIO.into(), Value::from(value));
        Ok(())
    }
}

// ── Node scope ──────────────────────────────────────────────────────

/// Per-node override blob, keyed by node name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOverrides(BTreeMap<String, Map<String, Value>>);

impl NodeOverrides {
    pub fn decode(envelope: &Value) -> Result<Self, Error> {
        decode_envelope(envelope)?
            .into_iter()
            .map(|(node, value)| match value {
                Value::Object(config) => Ok((node, config)),
                other => Err(Error::Deserialization {
                    message: format!("overrides for node '{node}' are not an object"),
                    body: other.to_string(),
                }),
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }

    pub fn encode(&self) -> Result<Value, Error> {
        encode_envelope(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn node(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name)
    }

    pub fn max_mcs(&self, node: &str) -> Option<i64> {
        self.0
            .get(node)?
            .get(LINK_PARAMS_BASE)?
            .get(FW_PARAMS)?
            .get(LA_MAX_MCS)?
            .as_i64()
    }

    /// Set `linkParamsBase.fwParams.laMaxMcs` on every node in the blob.
    ///
    /// Node blocks commonly start empty, so missing intermediate objects
    /// are created.
    pub fn set_max_mcs(&mut self, value: i64) {
        for config in self.0.values_mut() {
            let mut link = take_object(config, LINK_PARAMS_BASE);
            let mut fw = take_object(&mut link, FW_PARAMS);
            fw.insert(LA_MAX_MCS.into(), Value::from(value));
            link.insert(FW_PARAMS.into(), Value::Object(fw));
            config.insert(LINK_PARAMS_BASE.into(), Value::Object(link));
        }
    }
}

impl serde::Serialize for NodeOverrides {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl serde::Serialize for NetworkOverrides {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
