//! Configuration Maps
//!
//! Converts quantizer settings to and from loosely typed `serde_json` maps,
//! the form host layers use to store and re-create quantizers.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::types::{QuantParams, QuantizationScheme, QuantizerConfig};

/// Settings recovered from a configuration map.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    /// Numeric configuration.
    pub config: QuantizerConfig,
    /// Thresholds or ranges.
    pub params: QuantParams,
    /// Cluster centers, if the map had any.
    pub cluster_centers: Option<Vec<f32>>,
}

// =============================================================================
// Serialization
// =============================================================================

/// Builds the configuration map of a quantizer.
///
/// Keys are limited to those meaningful for `scheme`. Absent optional values
/// are written as `null`.
pub fn to_map(
    scheme: QuantizationScheme,
    config: &QuantizerConfig,
    params: &QuantParams,
    cluster_centers: Option<&[f32]>,
) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("num_bits".into(), Value::from(config.num_bits));

    match params {
        QuantParams::Threshold(threshold) => {
            map.insert("threshold".into(), list(threshold));
            map.insert("signed".into(), Value::from(config.signed));
        }
        QuantParams::Range {
            min_range,
            max_range,
        } => {
            map.insert("min_range".into(), list(min_range));
            map.insert("max_range".into(), list(max_range));
        }
    }

    map.insert("per_channel".into(), Value::from(config.per_channel));
    map.insert(
        "channel_axis".into(),
        config.channel_axis.map_or(Value::Null, Value::from),
    );
    map.insert(
        "input_rank".into(),
        config.input_rank.map_or(Value::Null, Value::from),
    );

    if scheme.is_lut() {
        if let Some(centers) = cluster_centers {
            map.insert("cluster_centers".into(), list(centers));
        }
        map.insert(
            "multiplier_n_bits".into(),
            Value::from(config.multiplier_n_bits),
        );
        map.insert("eps".into(), Value::from(config.eps));
    }

    map
}

fn list(values: &[f32]) -> Value {
    Value::Array(values.iter().map(|&v| Value::from(v)).collect())
}

// =============================================================================
// Parsing
// =============================================================================

/// Reads the settings of a `scheme` quantizer from a configuration map.
///
/// Missing optional keys take their defaults and unknown keys are ignored.
/// The result still has to pass validation.
pub fn from_map(
    scheme: QuantizationScheme,
    map: &Map<String, Value>,
) -> Result<ParsedConfig, ConfigError> {
    let defaults = QuantizerConfig::default();
    let config = QuantizerConfig {
        num_bits: field(map, "num_bits")?.unwrap_or(defaults.num_bits),
        signed: field(map, "signed")?.unwrap_or(defaults.signed),
        per_channel: field(map, "per_channel")?.unwrap_or(defaults.per_channel),
        channel_axis: field(map, "channel_axis")?,
        input_rank: field(map, "input_rank")?,
        multiplier_n_bits: field(map, "multiplier_n_bits")?
            .unwrap_or(defaults.multiplier_n_bits),
        eps: field(map, "eps")?.unwrap_or(defaults.eps),
    };

    let params = if scheme.uses_range() {
        let min_range = float_list(map, "min_range")?;
        let max_range = float_list(map, "max_range")?;
        match (min_range, max_range) {
            (Some(min_range), Some(max_range)) => QuantParams::Range {
                min_range,
                max_range,
            },
            _ => {
                return Err(ConfigError::MissingParameter {
                    scheme,
                    name: "min_range and max_range",
                })
            }
        }
    } else {
        let threshold = float_list(map, "threshold")?.ok_or(ConfigError::MissingParameter {
            scheme,
            name: "threshold",
        })?;
        QuantParams::Threshold(threshold)
    };

    Ok(ParsedConfig {
        config,
        params,
        cluster_centers: float_list(map, "cluster_centers")?,
    })
}

/// Reads an optional scalar key; `null` counts as absent.
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Result<Option<T>, ConfigError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ConfigError::InvalidField {
                field: key.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Reads an optional list of numbers.
fn float_list(map: &Map<String, Value>, key: &str) -> Result<Option<Vec<f32>>, ConfigError> {
    let items = match map.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ConfigError::WrongThresholdType {
                field: key.to_string(),
                found: json_type(other).to_string(),
            })
        }
    };

    items
        .iter()
        .map(|item| {
            item.as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| ConfigError::InvalidField {
                    field: key.to_string(),
                    message: format!("expected a number but found {}", json_type(item)),
                })
        })
        .collect::<Result<Vec<f32>, _>>()
        .map(Some)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

// =============================================================================
// Tests
// =============================================================================
