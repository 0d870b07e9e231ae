//! JSON settings of constraint builders.
//!
//! A builder is described by a process entry of the form
//!
//! ```json
//! {
//!     "process_name" : "RBE2Process",
//!     "Parameters" : {
//!         "independent_model_part_name" : "hub",
//!         "dependent_model_part_name" : "rim",
//!         "rot_x" : false
//!     }
//! }
//! ```
//!
//! The `Parameters` object is parsed into the settings struct of the selected builder. Keys the
//! builder does not know are rejected, missing keys take the builder's defaults.
use crate::dof::Axis;
use crate::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a process list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessSettings {
    pub process_name: String,
    #[serde(rename = "Parameters", default = "empty_object")]
    pub parameters: Value,
    /// Accepted for compatibility with existing process lists, not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_module: Option<String>,
    /// Accepted for compatibility with existing process lists, not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kratos_module: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl ProcessSettings {
    pub fn new(process_name: impl Into<String>, parameters: Value) -> Self {
        Self {
            process_name: process_name.into(),
            parameters,
            python_module: None,
            kratos_module: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|err| Error::configuration(format!("invalid process settings: {}", err)))
    }

    /// Parses a JSON array of process entries.
    pub fn list_from_json_str(json: &str) -> Result<Vec<Self>, Error> {
        serde_json::from_str(json).map_err(|err| Error::configuration(format!("invalid process list: {}", err)))
    }

    /// Deserializes the `Parameters` object into the settings type of a builder.
    pub fn parameters<P: DeserializeOwned>(&self) -> Result<P, Error> {
        parse_parameters(&self.parameters)
    }
}

pub fn parse_parameters<P: DeserializeOwned>(parameters: &Value) -> Result<P, Error> {
    P::deserialize(parameters).map_err(|err| Error::configuration(format!("invalid parameters: {}", err)))
}

pub(crate) fn enabled() -> bool {
    true
}

pub(crate) fn unit_coefficient() -> f64 {
    1.0
}

/// The axes whose flag is set, in x, y, z order.
pub(crate) fn enabled_axes(flags: [bool; 3]) -> Vec<Axis> {
    Axis::ALL
        .iter()
        .zip(flags)
        .filter(|(_, enabled)| *enabled)
        .map(|(axis, _)| *axis)
        .collect()
}
