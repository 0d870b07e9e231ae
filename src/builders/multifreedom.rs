use crate::allocator::IdAllocator;
use crate::builders::{ensure_groups_exist, ConstraintBuilder};
use crate::constraint::Constraint;
use crate::dof::{DofRef, Variable};
use crate::model::Model;
use crate::settings::{enabled, enabled_axes, parse_parameters, unit_coefficient};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultifreedomSettings {
    #[serde(alias = "master_model_part_name")]
    pub independent_model_part_name: String,
    #[serde(alias = "slave_model_part_name")]
    pub dependent_model_part_name: String,
    #[serde(default = "enabled")]
    pub x: bool,
    #[serde(default = "enabled")]
    pub y: bool,
    #[serde(default = "enabled")]
    pub z: bool,
    #[serde(default = "unit_coefficient")]
    pub coefficient: f64,
    #[serde(default)]
    pub constant: f64,
}

impl MultifreedomSettings {
    /// Settings tying all translations with coefficient 1 and no offset.
    pub fn new(independent: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            independent_model_part_name: independent.into(),
            dependent_model_part_name: dependent.into(),
            x: true,
            y: true,
            z: true,
            coefficient: 1.0,
            constant: 0.0,
        }
    }

    pub fn with_relation(mut self, coefficient: f64, constant: f64) -> Self {
        self.coefficient = coefficient;
        self.constant = constant;
        self
    }

    pub fn with_translations(mut self, x: bool, y: bool, z: bool) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }
}

/// Uniform affine relation between one independent node and a group of dependent nodes (RBE1).
///
/// For each dependent node and enabled axis: `u_dependent = coefficient * u_independent + constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultifreedomBuilder {
    settings: MultifreedomSettings,
}

impl MultifreedomBuilder {
    pub const PROCESS_NAME: &'static str = "RBE1Process";

    /// Alternative tag used by older process lists.
    pub const LEGACY_PROCESS_NAME: &'static str = "MakeMultifreedomConstraintsProcess";

    pub fn new(settings: MultifreedomSettings) -> Result<Self, Error> {
        if !settings.coefficient.is_finite() || !settings.constant.is_finite() {
            return Err(Error::configuration("coefficient and constant must be finite"));
        }
        Ok(Self { settings })
    }

    pub fn from_parameters(parameters: &Value, model: &Model) -> Result<Self, Error> {
        let settings: MultifreedomSettings = parse_parameters(parameters)?;
        ensure_groups_exist(
            model,
            [
                settings.independent_model_part_name.as_str(),
                settings.dependent_model_part_name.as_str(),
            ],
        )?;
        Self::new(settings)
    }

    pub fn settings(&self) -> &MultifreedomSettings {
        &self.settings
    }
}

impl ConstraintBuilder for MultifreedomBuilder {
    fn name(&self) -> &str {
        Self::PROCESS_NAME
    }

    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error> {
        let s = &self.settings;
        let independent = model.group(&s.independent_model_part_name)?;
        let dependent = model.group(&s.dependent_model_part_name)?;
        let master_id = independent.single_node("independent")?;
        let axes = enabled_axes([s.x, s.y, s.z]);

        let mut batch = Vec::with_capacity(dependent.len() * axes.len());
        for &node_id in dependent.nodes() {
            for &axis in &axes {
                let variable = Variable::displacement(axis);
                batch.push(Constraint::single(
                    ids.next_id(),
                    DofRef::new(master_id, variable),
                    DofRef::new(node_id, variable),
                    s.coefficient,
                    s.constant,
                ));
            }
        }
        Ok(batch)
    }
}
