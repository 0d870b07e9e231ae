use crate::allocator::IdAllocator;
use crate::builders::{ensure_groups_exist, ConstraintBuilder};
use crate::constraint::Constraint;
use crate::dof::{DofRef, Variable};
use crate::model::Model;
use crate::settings::{enabled, enabled_axes, parse_parameters};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings of [`DistributingLinkBuilder`].
///
/// Only translations can be distributed. Rotational keys are not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributingLinkSettings {
    pub independent_model_part_name: String,
    pub dependent_model_part_name: String,
    #[serde(default = "enabled")]
    pub x: bool,
    #[serde(default = "enabled")]
    pub y: bool,
    #[serde(default = "enabled")]
    pub z: bool,
}

impl DistributingLinkSettings {
    pub fn new(independent: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            independent_model_part_name: independent.into(),
            dependent_model_part_name: dependent.into(),
            x: true,
            y: true,
            z: true,
        }
    }

    pub fn with_translations(mut self, x: bool, y: bool, z: bool) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }
}

/// Distributing link between a group of independent nodes and one dependent node (RBE3).
///
/// The dependent node's displacement along each enabled axis is the mean of the independent
/// nodes' displacements along that axis: one constraint with coefficient `1/N` is emitted per
/// independent node and axis.
///
/// The rotation of the dependent node is not coupled to the independent translations.
// TODO: Derive and test the rotational coupling coefficients (weighted by the inverse offsets
// of the independent nodes) before enabling rot_x/rot_y/rot_z here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributingLinkBuilder {
    settings: DistributingLinkSettings,
}

impl DistributingLinkBuilder {
    pub const PROCESS_NAME: &'static str = "RBE3Process";

    pub fn new(settings: DistributingLinkSettings) -> Self {
        Self { settings }
    }

    pub fn from_parameters(parameters: &Value, model: &Model) -> Result<Self, Error> {
        let settings: DistributingLinkSettings = parse_parameters(parameters)?;
        ensure_groups_exist(
            model,
            [
                settings.independent_model_part_name.as_str(),
                settings.dependent_model_part_name.as_str(),
            ],
        )?;
        Ok(Self::new(settings))
    }

    pub fn settings(&self) -> &DistributingLinkSettings {
        &self.settings
    }
}

impl ConstraintBuilder for DistributingLinkBuilder {
    fn name(&self) -> &str {
        Self::PROCESS_NAME
    }

    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error> {
        let s = &self.settings;
        let independent = model.group(&s.independent_model_part_name)?;
        let dependent = model.group(&s.dependent_model_part_name)?;
        let slave_id = dependent.single_node("dependent")?;

        if independent.is_empty() {
            return Err(Error::configuration(format!(
                "independent node group '{}' has no nodes to distribute over",
                independent.name()
            )));
        }
        let weight = 1.0 / independent.len() as f64;
        let axes = enabled_axes([s.x, s.y, s.z]);

        let mut batch = Vec::with_capacity(independent.len() * axes.len());
        for &node_id in independent.nodes() {
            for &axis in &axes {
                let variable = Variable::displacement(axis);
                batch.push(Constraint::single(
                    ids.next_id(),
                    DofRef::new(node_id, variable),
                    DofRef::new(slave_id, variable),
                    weight,
                    0.0,
                ));
            }
        }
        Ok(batch)
    }
}
