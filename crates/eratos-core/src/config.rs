//! Engine configuration.
//!
//! Every field has a default, so partial JSON/YAML documents are accepted. Overrides are applied
//! with a deep merge over the current values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub history: HistoryConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of undoable edits; unbounded when absent.
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Separation between nodes of one rank in the schema event region.
    pub nodesep: f64,
    /// Separation between ranks in the schema event region.
    pub ranksep: f64,
    pub region_padding: f64,
    /// Column count of the inferred event grid.
    pub grid_columns: usize,
    pub cell_gap: f64,
    /// Width available to a row of entities.
    pub viewport_width: f64,
    pub origin: Position,
    /// Size used for nodes that have not been measured yet.
    pub default_node_size: Dimensions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            nodesep: 40.0,
            ranksep: 80.0,
            region_padding: 40.0,
            grid_columns: 4,
            cell_gap: 20.0,
            viewport_width: 1200.0,
            origin: Position::default(),
            default_node_size: Dimensions {
                width: 160.0,
                height: 60.0,
            },
        }
    }
}

fn config_error(message: impl std::fmt::Display) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(config_error)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(config_error)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value).map_err(config_error)?;
        config.check()?;
        Ok(config)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(config_error)
    }

    /// Applies a partial override; keys absent from `overrides` keep their current values.
    pub fn merged(&self, overrides: &Value) -> Result<Self> {
        let mut base = self.to_value()?;
        deep_merge_value(&mut base, overrides);
        Self::from_value(base)
    }

    /// Rejects values the layout cannot work with.
    pub fn check(&self) -> Result<()> {
        let l = &self.layout;
        if l.grid_columns == 0 {
            return Err(config_error("layout.gridColumns must be at least 1"));
        }
        let non_negative = [
            ("layout.nodesep", l.nodesep),
            ("layout.ranksep", l.ranksep),
            ("layout.regionPadding", l.region_padding),
            ("layout.cellGap", l.cell_gap),
            ("layout.viewportWidth", l.viewport_width),
            ("layout.defaultNodeSize.width", l.default_node_size.width),
            ("layout.defaultNodeSize.height", l.default_node_size.height),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(config_error(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.history.capacity == Some(0) {
            return Err(config_error("history.capacity must be at least 1"));
        }
        Ok(())
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
