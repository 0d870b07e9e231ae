use crate::allocator::IdAllocator;
use crate::builders::{ensure_groups_exist, ConstraintBuilder};
use crate::constraint::Constraint;
use crate::dof::{DofCapability, DofRef, Variable};
use crate::model::Model;
use crate::settings::parse_parameters;
use crate::{Error, NodeId};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceSlidingSettings {
    pub model_part_name: String,
    pub node_id: NodeId,
    #[serde(default = "default_normal")]
    pub surface_normal: [f64; 3],
}

fn default_normal() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// Keeps a node on a plane through its initial position: `n · u = 0`.
///
/// The x-displacement is the slave and the y/z-displacements are the masters,
/// `u_x = -(n_y / n_x) u_y - (n_z / n_x) u_z`, so the normal must have a non-vanishing
/// x-component. This is checked when the builder is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSlidingBuilder {
    model_part_name: String,
    node_id: NodeId,
    normal: Vector3<f64>,
}

impl SurfaceSlidingBuilder {
    pub const PROCESS_NAME: &'static str = "MakeSurfaceSlidingConstraint";

    pub fn new(settings: SurfaceSlidingSettings) -> Result<Self, Error> {
        let normal = Vector3::from(settings.surface_normal);
        let norm = normal.norm();
        if !norm.is_finite() || norm == 0.0 {
            return Err(Error::configuration(format!(
                "surface normal {:?} is not a valid direction",
                settings.surface_normal
            )));
        }
        if normal.x.abs() <= 1e-12 * norm {
            return Err(Error::configuration(format!(
                "surface normal {:?} has a vanishing x-component, the x-displacement cannot be the slave",
                settings.surface_normal
            )));
        }
        Ok(Self {
            model_part_name: settings.model_part_name,
            node_id: settings.node_id,
            normal,
        })
    }

    pub fn from_parameters(parameters: &Value, model: &Model) -> Result<Self, Error> {
        let settings: SurfaceSlidingSettings = parse_parameters(parameters)?;
        ensure_groups_exist(model, [settings.model_part_name.as_str()])?;
        Self::new(settings)
    }

    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }
}

impl ConstraintBuilder for SurfaceSlidingBuilder {
    fn name(&self) -> &str {
        Self::PROCESS_NAME
    }

    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error> {
        let group = model.group(&self.model_part_name)?;
        if !group.contains(self.node_id) {
            return Err(Error::model_state(format!(
                "node {} is not part of node group '{}'",
                self.node_id, self.model_part_name
            )));
        }

        let n = &self.normal;
        let mut masters = vec![(DofRef::new(self.node_id, Variable::DisplacementY), -n.y / n.x)];
        // Planar models carry no z-displacement, which is fine as long as the normal lies in-plane
        let has_z = model.dof_capability(self.node_id, Variable::DisplacementZ)? == DofCapability::Present;
        if has_z || n.z != 0.0 {
            masters.push((DofRef::new(self.node_id, Variable::DisplacementZ), -n.z / n.x));
        }

        let slave = DofRef::new(self.node_id, Variable::DisplacementX);
        Ok(vec![Constraint::new(ids.next_id(), masters, slave, 0.0)])
    }
}
