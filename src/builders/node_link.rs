use crate::allocator::IdAllocator;
use crate::builders::{ensure_groups_exist, ConstraintBuilder};
use crate::constraint::Constraint;
use crate::dof::{Axis, DofRef, Variable};
use crate::model::{Configuration, Model};
use crate::settings::parse_parameters;
use crate::{Error, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeLinkSettings {
    pub model_part_name: String,
    #[serde(default)]
    pub node_pairs: Vec<[NodeId; 2]>,
    /// Compute the link directions from the current instead of the reference positions.
    #[serde(default)]
    pub move_mesh_flag: bool,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_dimension() -> usize {
    3
}

/// Links pairs of nodes so that their distance is preserved to first order.
///
/// With `Δ = x_right - x_left`, the linearised distance constraint reads `Δ · (u_right - u_left) = 0`.
/// The right node's displacement along the dominant component `k` of `Δ` becomes the slave:
///
/// ```text
/// u_right,k = u_left,k - Σ_{j ≠ k} (Δ_j / Δ_k) (u_right,j - u_left,j)
/// ```
///
/// Only the first `dimension` components take part, so planar models link in the xy-plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLinkBuilder {
    settings: NodeLinkSettings,
}

impl NodeLinkBuilder {
    pub const PROCESS_NAME: &'static str = "MakeLinkConstraints";

    pub fn new(settings: NodeLinkSettings) -> Result<Self, Error> {
        if !(2..=3).contains(&settings.dimension) {
            return Err(Error::configuration(format!(
                "link dimension must be 2 or 3, got {}",
                settings.dimension
            )));
        }
        if let Some([left, _]) = settings.node_pairs.iter().find(|[left, right]| left == right) {
            return Err(Error::configuration(format!("node {} cannot be linked to itself", left)));
        }
        Ok(Self { settings })
    }

    pub fn from_parameters(parameters: &Value, model: &Model) -> Result<Self, Error> {
        let settings: NodeLinkSettings = parse_parameters(parameters)?;
        ensure_groups_exist(model, [settings.model_part_name.as_str()])?;
        Self::new(settings)
    }

    pub fn settings(&self) -> &NodeLinkSettings {
        &self.settings
    }

    fn configuration(&self) -> Configuration {
        if self.settings.move_mesh_flag {
            Configuration::Current
        } else {
            Configuration::Reference
        }
    }
}

impl ConstraintBuilder for NodeLinkBuilder {
    fn name(&self) -> &str {
        Self::PROCESS_NAME
    }

    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error> {
        let group = model.group(&self.settings.model_part_name)?;
        let dim = self.settings.dimension;
        let configuration = self.configuration();

        let mut batch = Vec::with_capacity(self.settings.node_pairs.len());
        for &[left, right] in &self.settings.node_pairs {
            for node in [left, right] {
                if !group.contains(node) {
                    return Err(Error::model_state(format!(
                        "node {} is not part of node group '{}'",
                        node,
                        group.name()
                    )));
                }
            }

            let delta = model.node(right)?.position(configuration) - model.node(left)?.position(configuration);
            let delta = &delta.as_slice()[..dim];
            let (k, delta_k) = delta
                .iter()
                .copied()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
                .unwrap_or((0, 0.0));
            if delta_k == 0.0 {
                return Err(Error::configuration(format!(
                    "nodes {} and {} coincide, the link direction is undefined",
                    left, right
                )));
            }

            let displacement = |index| {
                Axis::from_index(index)
                    .map(Variable::displacement)
                    .ok_or_else(|| Error::configuration(format!("no displacement along axis {}", index)))
            };
            let mut masters = vec![(DofRef::new(left, displacement(k)?), 1.0)];
            for (j, delta_j) in delta.iter().enumerate().filter(|(j, _)| *j != k) {
                let ratio = delta_j / delta_k;
                let variable = displacement(j)?;
                masters.push((DofRef::new(right, variable), -ratio));
                masters.push((DofRef::new(left, variable), ratio));
            }

            let slave = DofRef::new(right, displacement(k)?);
            batch.push(Constraint::new(ids.next_id(), masters, slave, 0.0));
        }
        Ok(batch)
    }
}
