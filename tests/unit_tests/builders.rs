use crate::hub_and_rim;
use fenris_mpc::allocator::IdAllocator;
use fenris_mpc::builders::*;
use fenris_mpc::dof::{DofRef, Variable};
use fenris_mpc::model::{Model, Node};
use fenris_mpc::proptest::linked_model;
use fenris_mpc::relation::{DofNumbering, RelationMatrix};
use matrixcompare::assert_scalar_eq;
use nalgebra::{DVector, Point3, Vector3};
use proptest::prelude::*;
use serde_json::json;

fn dof(node: usize, variable: Variable) -> DofRef {
    DofRef::new(node, variable)
}

#[test]
fn rigid_link_single_axis_emits_direct_and_zero_couplings() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0)]);
    let settings = RigidLinkSettings::new("hub", "rim")
        .with_translations(true, false, false)
        .with_rotations(false, false, false);
    let builder = RigidLinkBuilder::new(settings);
    let batch = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap();

    assert_eq!(batch.len(), 3);
    let direct = &batch[0];
    assert_eq!(direct.slave(), dof(2, Variable::DisplacementX));
    assert_eq!(direct.masters(), &[(dof(1, Variable::DisplacementX), 1.0)]);
    assert_eq!(direct.constant(), 0.0);

    // Offset (1, 0, 0) has no y- or z-component, so both couplings carry explicit zeros
    let couplings: Vec<_> = batch[1..].iter().map(|c| c.masters()[0]).collect();
    assert_eq!(couplings[0].0, dof(1, Variable::RotationY));
    assert_eq!(couplings[0].1, 0.0);
    assert_eq!(couplings[1].0, dof(1, Variable::RotationZ));
    assert_eq!(couplings[1].1, 0.0);
    assert!(batch[1..].iter().all(|c| c.slave() == dof(2, Variable::DisplacementX)));

    let ids: Vec<_> = batch.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn rigid_link_coupling_coefficients_are_offset_components() {
    let model = hub_and_rim(Point3::new(1.0, 1.0, 1.0), &[Point3::new(3.0, 4.0, 6.0)]);
    let builder = RigidLinkBuilder::new(RigidLinkSettings::new("hub", "rim").with_rotations(false, false, false));
    let batch = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap();

    // Offset (2, 3, 5): per axis one direct and two coupling constraints
    assert_eq!(batch.len(), 9);
    let coupling = |index: usize| batch[index].masters()[0];
    assert_eq!(coupling(1), (dof(1, Variable::RotationY), 5.0));
    assert_eq!(coupling(2), (dof(1, Variable::RotationZ), -3.0));
    assert_eq!(coupling(4), (dof(1, Variable::RotationX), -5.0));
    assert_eq!(coupling(5), (dof(1, Variable::RotationZ), 2.0));
    assert_eq!(coupling(7), (dof(1, Variable::RotationX), 3.0));
    assert_eq!(coupling(8), (dof(1, Variable::RotationY), -2.0));
}

#[test]
fn rigid_link_skips_rotations_of_solid_nodes() {
    let mut model = Model::new();
    model.add_node(Node::structural(1, Point3::origin())).unwrap();
    model.add_node(Node::solid(2, Point3::new(0.0, 1.0, 0.0))).unwrap();
    model.add_node(Node::structural(3, Point3::new(0.0, 0.0, 1.0))).unwrap();
    model.add_group("hub", [1]).unwrap();
    model.add_group("rim", [2, 3]).unwrap();

    let builder = RigidLinkBuilder::new(RigidLinkSettings::new("hub", "rim"));
    let batch = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap();

    let rotational_slaves: Vec<_> = batch
        .iter()
        .map(|c| c.slave())
        .filter(|slave| Variable::ROTATIONS.contains(&slave.variable))
        .collect();
    assert_eq!(
        rotational_slaves,
        vec![
            dof(3, Variable::RotationX),
            dof(3, Variable::RotationY),
            dof(3, Variable::RotationZ)
        ]
    );
    // 9 translational constraints per node, 3 rotational ones for the structural node only
    assert_eq!(batch.len(), 2 * 9 + 3);
}

#[test]
fn rigid_link_to_solid_independent_node_is_a_model_state_error() {
    let mut model = Model::new();
    model.add_node(Node::solid(1, Point3::origin())).unwrap();
    model.add_node(Node::solid(2, Point3::new(0.0, 3.0, 4.0))).unwrap();
    model.add_group("hub", [1]).unwrap();
    model.add_group("rim", [2]).unwrap();

    // The couplings of the offset (0, 3, 4) need the rotations of the independent node
    let builder = RigidLinkBuilder::new(RigidLinkSettings::new("hub", "rim"));
    let error = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap_err();
    assert!(error.is_model_state_error());
    let error = model.apply(&builder).unwrap_err();
    assert!(error.is_model_state_error());
    assert!(model.constraints().is_empty());

    // Without translations nothing couples to the missing rotations
    let rotations_only = RigidLinkSettings::new("hub", "rim").with_translations(false, false, false);
    let batch = RigidLinkBuilder::new(rotations_only)
        .build(&model, &mut IdAllocator::starting_at(1))
        .unwrap();
    assert!(batch.is_empty());
}

#[test]
fn rigid_link_requires_exactly_one_independent_node() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
    // Swap the roles, so that the independent group holds two nodes
    let builder = RigidLinkBuilder::new(RigidLinkSettings::new("rim", "hub"));
    let error = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap_err();
    assert!(error.is_configuration_error());
}

#[test]
fn rigid_link_from_parameters_requires_existing_groups() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0)]);
    let parameters = json!({
        "independent_model_part_name": "hub",
        "dependent_model_part_name": "spokes"
    });
    let error = RigidLinkBuilder::from_parameters(&parameters, &model).unwrap_err();
    assert!(error.is_model_state_error());
}

#[test]
fn distributing_link_weights_are_uniform() {
    let rim = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
    ];
    let model = hub_and_rim(Point3::origin(), &rim);
    let builder = DistributingLinkBuilder::new(DistributingLinkSettings::new("rim", "hub"));
    let batch = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap();

    assert_eq!(batch.len(), 4 * 3);
    for variable in Variable::DISPLACEMENTS {
        let axis_constraints: Vec<_> = batch.iter().filter(|c| c.slave() == dof(1, variable)).collect();
        assert_eq!(axis_constraints.len(), 4);
        let total: f64 = axis_constraints.iter().map(|c| c.masters()[0].1).sum();
        assert_scalar_eq!(total, 1.0, comp = abs, tol = 1e-14);
        for constraint in axis_constraints {
            assert_eq!(constraint.masters().len(), 1);
            assert_eq!(constraint.masters()[0].0.variable, variable);
            assert_eq!(constraint.masters()[0].1, 0.25);
        }
    }
}

#[test]
fn distributing_link_rejects_rotation_flags() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0)]);
    let parameters = json!({
        "independent_model_part_name": "rim",
        "dependent_model_part_name": "hub",
        "rot_x": true
    });
    let error = DistributingLinkBuilder::from_parameters(&parameters, &model).unwrap_err();
    assert!(error.is_configuration_error());
}

#[test]
fn distributing_link_requires_single_dependent_node() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
    let builder = DistributingLinkBuilder::new(DistributingLinkSettings::new("hub", "rim"));
    let error = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap_err();
    assert!(error.is_configuration_error());
}

#[test]
fn multifreedom_relation_applies_coefficient_and_constant() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
    let settings = MultifreedomSettings::new("hub", "rim")
        .with_relation(2.0, 0.5)
        .with_translations(false, true, false);
    let builder = MultifreedomBuilder::new(settings).unwrap();
    let batch = builder.build(&model, &mut IdAllocator::starting_at(10)).unwrap();

    assert_eq!(batch.len(), 2);
    for (constraint, node) in batch.iter().zip([2, 3]) {
        assert_eq!(constraint.slave(), dof(node, Variable::DisplacementY));
        assert_eq!(constraint.masters(), &[(dof(1, Variable::DisplacementY), 2.0)]);
        assert_eq!(constraint.constant(), 0.5);
        assert_eq!(constraint.evaluate(|_| 3.0), 6.5);
    }
    assert_eq!(batch[0].id(), 10);
    assert_eq!(batch[1].id(), 11);
}

#[test]
fn multifreedom_accepts_legacy_group_keys() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0)]);
    let parameters = json!({
        "master_model_part_name": "hub",
        "slave_model_part_name": "rim",
        "coefficient": -1.0
    });
    let builder = MultifreedomBuilder::from_parameters(&parameters, &model).unwrap();
    assert_eq!(builder.settings().independent_model_part_name, "hub");
    assert_eq!(builder.settings().coefficient, -1.0);
    assert_eq!(builder.settings().constant, 0.0);
}

#[test]
fn multifreedom_rejects_non_finite_coefficients() {
    let settings = MultifreedomSettings::new("hub", "rim").with_relation(f64::NAN, 0.0);
    assert!(MultifreedomBuilder::new(settings).unwrap_err().is_configuration_error());
}

#[test]
fn surface_sliding_with_in_plane_normal_is_rejected() {
    let settings = SurfaceSlidingSettings {
        model_part_name: "rim".to_string(),
        node_id: 2,
        surface_normal: [0.0, 1.0, 0.0],
    };
    let error = SurfaceSlidingBuilder::new(settings).unwrap_err();
    assert!(error.is_configuration_error());
}

#[test]
fn surface_sliding_keeps_node_on_plane() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0)]);
    let settings = SurfaceSlidingSettings {
        model_part_name: "rim".to_string(),
        node_id: 2,
        surface_normal: [2.0, 1.0, -4.0],
    };
    let builder = SurfaceSlidingBuilder::new(settings).unwrap();
    let batch = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap();
    assert_eq!(batch.len(), 1);

    let constraint = &batch[0];
    assert_eq!(constraint.slave(), dof(2, Variable::DisplacementX));
    let (u_y, u_z) = (0.3, -1.1);
    let u_x = constraint.evaluate(|master| match master.variable {
        Variable::DisplacementY => u_y,
        Variable::DisplacementZ => u_z,
        _ => panic!("unexpected master {}", master),
    });
    let normal = Vector3::new(2.0, 1.0, -4.0);
    assert_scalar_eq!(normal.dot(&Vector3::new(u_x, u_y, u_z)), 0.0, comp = abs, tol = 1e-14);
}

#[test]
fn surface_sliding_node_must_belong_to_group() {
    let model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 0.0, 0.0)]);
    let settings = SurfaceSlidingSettings {
        model_part_name: "rim".to_string(),
        node_id: 1,
        surface_normal: [1.0, 0.0, 0.0],
    };
    let builder = SurfaceSlidingBuilder::new(settings).unwrap();
    let error = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap_err();
    assert!(error.is_model_state_error());
}

#[test]
fn node_link_preserves_distance_to_first_order() {
    let mut model = hub_and_rim(Point3::origin(), &[Point3::new(1.0, 2.0, 0.5)]);
    model.add_group("all", [1, 2]).unwrap();
    let settings = NodeLinkSettings {
        model_part_name: "all".to_string(),
        node_pairs: vec![[1, 2]],
        move_mesh_flag: false,
        dimension: 3,
    };
    let builder = NodeLinkBuilder::new(settings).unwrap();
    let batch = builder.build(&model, &mut IdAllocator::starting_at(1)).unwrap();

    assert_eq!(batch.len(), 1);
    let constraint = &batch[0];
    // The y-component dominates the offset
    assert_eq!(constraint.slave(), dof(2, Variable::DisplacementY));
    assert_eq!(constraint.masters().len(), 5);

    let u_left = Vector3::new(0.1, -0.4, 0.7);
    let mut u_right = Vector3::new(-0.3, 0.0, 0.2);
    let u_right_y = constraint.evaluate(|master| {
        let u = if master.node == 1 { &u_left } else { &u_right };
        u[master.variable.axis().index()]
    });
    u_right.y = u_right_y;
    let delta = Vector3::new(1.0, 2.0, 0.5);
    assert_scalar_eq!(delta.dot(&(u_right - u_left)), 0.0, comp = abs, tol = 1e-14);
}

#[test]
fn node_link_in_two_dimensions_ignores_z() {
    let mut model = Model::new();
    model.add_node(Node::solid(1, Point3::new(0.0, 0.0, 0.0))).unwrap();
    model.add_node(Node::solid(2, Point3::new(3.0, 1.0, 0.0))).unwrap();
    model.add_group("pair", [1, 2]).unwrap();
    let settings = NodeLinkSettings {
        model_part_name: "pair".to_string(),
        node_pairs: vec![[1, 2]],
        move_mesh_flag: false,
        dimension: 2,
    };
    let batch = NodeLinkBuilder::new(settings)
        .unwrap()
        .build(&model, &mut IdAllocator::starting_at(1))
        .unwrap();

    let constraint = &batch[0];
    assert_eq!(constraint.slave(), dof(2, Variable::DisplacementX));
    assert_eq!(
        constraint.masters(),
        &[
            (dof(1, Variable::DisplacementX), 1.0),
            (dof(2, Variable::DisplacementY), -1.0 / 3.0),
            (dof(1, Variable::DisplacementY), 1.0 / 3.0),
        ]
    );
}

#[test]
fn node_link_uses_current_positions_when_mesh_moves() {
    let mut model = Model::new();
    model.add_node(Node::solid(1, Point3::origin())).unwrap();
    model.add_node(Node::solid(2, Point3::new(1.0, 0.0, 0.0))).unwrap();
    model
        .node_mut(2)
        .unwrap()
        .set_displacement(&Vector3::new(-1.0, 2.0, 0.0));
    model.add_group("pair", [1, 2]).unwrap();

    let settings = |move_mesh_flag| NodeLinkSettings {
        model_part_name: "pair".to_string(),
        node_pairs: vec![[1, 2]],
        move_mesh_flag,
        dimension: 3,
    };
    let slave = |move_mesh_flag| {
        NodeLinkBuilder::new(settings(move_mesh_flag))
            .unwrap()
            .build(&model, &mut IdAllocator::starting_at(1))
            .unwrap()[0]
            .slave()
    };
    assert_eq!(slave(false), dof(2, Variable::DisplacementX));
    assert_eq!(slave(true), dof(2, Variable::DisplacementY));
}

#[test]
fn node_link_rejects_bad_settings_and_coincident_nodes() {
    let base = NodeLinkSettings {
        model_part_name: "pair".to_string(),
        node_pairs: vec![[1, 2]],
        move_mesh_flag: false,
        dimension: 3,
    };
    let four_dimensional = NodeLinkSettings {
        dimension: 4,
        ..base.clone()
    };
    assert!(NodeLinkBuilder::new(four_dimensional).unwrap_err().is_configuration_error());
    let self_link = NodeLinkSettings {
        node_pairs: vec![[2, 2]],
        ..base.clone()
    };
    assert!(NodeLinkBuilder::new(self_link).unwrap_err().is_configuration_error());

    let mut model = Model::new();
    model.add_node(Node::solid(1, Point3::new(1.0, 1.0, 1.0))).unwrap();
    model.add_node(Node::solid(2, Point3::new(1.0, 1.0, 1.0))).unwrap();
    model.add_group("pair", [1, 2]).unwrap();
    let error = NodeLinkBuilder::new(base)
        .unwrap()
        .build(&model, &mut IdAllocator::starting_at(1))
        .unwrap_err();
    assert!(error.is_configuration_error());
}

proptest! {
    #[test]
    fn rigid_link_reproduces_rigid_body_motion(
        linked in linked_model(5),
        translation in [-1.0..1.0, -1.0..1.0, -1.0..1.0],
        rotation in [-1.0..1.0, -1.0..1.0, -1.0..1.0]
    ) {
        let mut model = linked.model;
        let builder = RigidLinkBuilder::new(RigidLinkSettings::new("master", "dependents"));
        model.apply(&builder).unwrap();

        let numbering = DofNumbering::from_model(&model);
        let relation = RelationMatrix::from_constraints(&numbering, model.constraints()).unwrap();

        let t = Vector3::from(translation);
        let omega = Vector3::from(rotation);
        let mut u = DVector::zeros(numbering.len());
        for (i, variable) in Variable::ALL.iter().enumerate() {
            let value = if i < 3 { t[i] } else { omega[i - 3] };
            u[numbering.equation_id(&dof(linked.master, *variable)).unwrap()] = value;
        }
        let u_full = relation.expand(&u).unwrap();

        let master_position = *model.node(linked.master).unwrap().reference_position();
        for &dependent in &linked.dependents {
            let node = model.node(dependent).unwrap();
            let expected = t + omega.cross(&(node.reference_position() - master_position));
            for variable in Variable::DISPLACEMENTS {
                let value = u_full[numbering.equation_id(&dof(dependent, variable)).unwrap()];
                prop_assert!((value - expected[variable.axis().index()]).abs() <= 1e-10);
            }
            for variable in Variable::ROTATIONS.into_iter().filter(|v| node.has_dof(*v)) {
                let value = u_full[numbering.equation_id(&dof(dependent, variable)).unwrap()];
                prop_assert!((value - omega[variable.axis().index()]).abs() <= 1e-12);
            }
        }
    }
}
