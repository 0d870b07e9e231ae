use crate::allocator::IdAllocator;
use crate::builders::{ensure_groups_exist, ConstraintBuilder};
use crate::constraint::Constraint;
use crate::dof::{Axis, DofCapability, DofRef, Variable};
use crate::model::Model;
use crate::settings::{enabled, enabled_axes, parse_parameters};
use crate::Error;
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigidLinkSettings {
    pub independent_model_part_name: String,
    pub dependent_model_part_name: String,
    #[serde(default = "enabled")]
    pub x: bool,
    #[serde(default = "enabled")]
    pub y: bool,
    #[serde(default = "enabled")]
    pub z: bool,
    #[serde(default = "enabled")]
    pub rot_x: bool,
    #[serde(default = "enabled")]
    pub rot_y: bool,
    #[serde(default = "enabled")]
    pub rot_z: bool,
}

impl RigidLinkSettings {
    /// Settings with every translation and rotation enabled.
    pub fn new(independent: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            independent_model_part_name: independent.into(),
            dependent_model_part_name: dependent.into(),
            x: true,
            y: true,
            z: true,
            rot_x: true,
            rot_y: true,
            rot_z: true,
        }
    }

    pub fn with_translations(mut self, x: bool, y: bool, z: bool) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    pub fn with_rotations(mut self, rot_x: bool, rot_y: bool, rot_z: bool) -> Self {
        self.rot_x = rot_x;
        self.rot_y = rot_y;
        self.rot_z = rot_z;
        self
    }
}

/// Rigid links between one independent node and a group of dependent nodes (RBE2).
///
/// Each enabled translation of a dependent node follows the rigid-body motion of the independent
/// node, `u_dependent = u_independent + ω_independent × r`, where `r` is the offset of the dependent
/// node from the independent node in the reference configuration. This yields, per dependent node
/// and enabled axis, one direct constraint with coefficient 1 and two coupling constraints to the
/// independent node's rotations whose coefficients are offset components. Coupling constraints are
/// emitted even when their coefficient is zero, so the number of constraints per node only depends
/// on the enabled axes and the available degrees of freedom.
///
/// Rotations are only linked for dependent nodes that carry the rotational degree of freedom, so
/// dependent nodes of solid elements only get translational constraints. The independent node must
/// carry every rotation that is referenced; building fails with a model state error otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigidLinkBuilder {
    settings: RigidLinkSettings,
}

impl RigidLinkBuilder {
    pub const PROCESS_NAME: &'static str = "RBE2Process";

    pub fn new(settings: RigidLinkSettings) -> Self {
        Self { settings }
    }

    pub fn from_parameters(parameters: &Value, model: &Model) -> Result<Self, Error> {
        let settings: RigidLinkSettings = parse_parameters(parameters)?;
        ensure_groups_exist(
            model,
            [
                settings.independent_model_part_name.as_str(),
                settings.dependent_model_part_name.as_str(),
            ],
        )?;
        Ok(Self::new(settings))
    }

    pub fn settings(&self) -> &RigidLinkSettings {
        &self.settings
    }
}

/// The coefficients coupling the displacement along `axis` to the rotations of the independent
/// node, i.e. the `axis` component of `ω × delta` expressed per rotation component.
fn rotational_coupling(axis: Axis, delta: &Vector3<f64>) -> [(Axis, f64); 2] {
    match axis {
        Axis::X => [(Axis::Y, delta.z), (Axis::Z, -delta.y)],
        Axis::Y => [(Axis::X, -delta.z), (Axis::Z, delta.x)],
        Axis::Z => [(Axis::X, delta.y), (Axis::Y, -delta.x)],
    }
}

impl ConstraintBuilder for RigidLinkBuilder {
    fn name(&self) -> &str {
        Self::PROCESS_NAME
    }

    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error> {
        let s = &self.settings;
        let independent = model.group(&s.independent_model_part_name)?;
        let dependent = model.group(&s.dependent_model_part_name)?;
        let master_id = independent.single_node("independent")?;
        let master = model.node(master_id)?;

        let translations = enabled_axes([s.x, s.y, s.z]);
        let rotations = enabled_axes([s.rot_x, s.rot_y, s.rot_z]);

        let mut batch = Vec::new();
        for &node_id in dependent.nodes() {
            let node = model.node(node_id)?;
            let delta = node.reference_position() - master.reference_position();

            for &axis in &translations {
                let slave = DofRef::new(node_id, Variable::displacement(axis));
                let master_dof = DofRef::new(master_id, Variable::displacement(axis));
                batch.push(Constraint::single(ids.next_id(), master_dof, slave, 1.0, 0.0));

                for (rotation_axis, coefficient) in rotational_coupling(axis, &delta) {
                    let master_dof = DofRef::new(master_id, Variable::rotation(rotation_axis));
                    model.require_dof(&master_dof)?;
                    batch.push(Constraint::single(ids.next_id(), master_dof, slave, coefficient, 0.0));
                }
            }

            for &axis in &rotations {
                let rotation = Variable::rotation(axis);
                match model.dof_capability(node_id, rotation)? {
                    DofCapability::Present => {
                        let master_dof = DofRef::new(master_id, rotation);
                        model.require_dof(&master_dof)?;
                        let slave = DofRef::new(node_id, rotation);
                        batch.push(Constraint::single(ids.next_id(), master_dof, slave, 1.0, 0.0));
                    }
                    DofCapability::Absent => {
                        debug!("Dependent node {} has no {}, rotation not linked", node_id, rotation)
                    }
                }
            }
        }

        Ok(batch)
    }
}
