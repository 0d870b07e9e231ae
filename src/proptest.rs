//! Strategies for property-based testing with `proptest`.
use crate::basis::BasisKind;
use crate::model::{Model, Node};
use crate::NodeId;
use ::proptest::prelude::*;
use ::proptest::sample::select;
use nalgebra::Point3;

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    // Coordinates are kept moderate, since rigid-link coefficients are products of offsets and
    // huge offsets only make the tolerances of the tests meaningless
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// A model with one structural master node in the group `"master"` and a number of dependent
/// nodes in the group `"dependents"`.
#[derive(Debug, Clone)]
pub struct LinkedModel {
    pub model: Model,
    pub master: NodeId,
    pub dependents: Vec<NodeId>,
}

/// Linked models with between 1 and `max_dependents` dependent nodes.
///
/// Dependent nodes are structural (displacements and rotations) or solid (displacements only)
/// at random, so builders have to deal with missing rotational degrees of freedom.
pub fn linked_model(max_dependents: usize) -> impl Strategy<Value = LinkedModel> {
    let dependents = prop::collection::vec((point3(), any::<bool>()), 1..=max_dependents.max(1));
    (point3(), dependents).prop_map(|(master_position, dependents)| {
        let mut model = Model::new();
        let master = 1;
        model
            .add_node(Node::structural(master, master_position))
            .expect("master id is fresh");

        let mut dependent_ids = Vec::with_capacity(dependents.len());
        for (i, (position, structural)) in dependents.into_iter().enumerate() {
            let id = master + 1 + i;
            let node = if structural {
                Node::structural(id, position)
            } else {
                Node::solid(id, position)
            };
            model.add_node(node).expect("dependent ids are fresh");
            dependent_ids.push(id);
        }

        model.add_group("master", [master]).expect("master exists");
        model
            .add_group("dependents", dependent_ids.iter().copied())
            .expect("dependents exist");
        LinkedModel {
            model,
            master,
            dependents: dependent_ids,
        }
    })
}

pub fn basis_kind() -> impl Strategy<Value = BasisKind> {
    select(BasisKind::ALL.to_vec())
}

/// Three bases of the same element family ordered from finest to coarsest.
pub fn nested_levels() -> impl Strategy<Value = [BasisKind; 3]> {
    select(vec![
        [BasisKind::Line4, BasisKind::Line3, BasisKind::Line2],
        [BasisKind::Tri10, BasisKind::Tri6, BasisKind::Tri3],
    ])
}
