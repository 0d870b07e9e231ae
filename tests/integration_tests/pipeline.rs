//! Runs process lists through the registry and solves the resulting constrained systems.
use fenris_mpc::communicator::SerialCommunicator;
use fenris_mpc::graph::ConstraintGraph;
use fenris_mpc::model::{Model, Node};
use fenris_mpc::registry::BuilderRegistry;
use fenris_mpc::relation::{DofNumbering, RelationMatrix};
use fenris_mpc::settings::ProcessSettings;
use fenris_mpc::Error;
use nalgebra::{DMatrix, DVector, Point3};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rustc_hash::FxHashMap;

const PROCESS_LIST: &str = r#"[
    {
        "python_module" : "assign_rbe2_process",
        "process_name" : "RBE2Process",
        "Parameters" : {
            "independent_model_part_name" : "hub",
            "dependent_model_part_name" : "rim"
        }
    },
    {
        "process_name" : "MakeSurfaceSlidingConstraint",
        "Parameters" : {
            "model_part_name" : "slider",
            "node_id" : 4,
            "surface_normal" : [2.0, 1.0, 0.0]
        }
    },
    {
        "process_name" : "MakeLinkConstraints",
        "Parameters" : {
            "model_part_name" : "pairs",
            "node_pairs" : [[5, 6]]
        }
    },
    {
        "process_name" : "RBE3Process",
        "Parameters" : {
            "independent_model_part_name" : "anchors",
            "dependent_model_part_name" : "target"
        }
    }
]"#;

fn mixed_model() -> Model {
    let mut model = Model::new();
    let structural = [(1, [0.0, 0.0, 0.0]), (2, [1.0, 0.0, 0.0]), (3, [0.0, 1.0, 0.5])];
    for (id, [x, y, z]) in structural {
        model.add_node(Node::structural(id, Point3::new(x, y, z))).unwrap();
    }
    let solid = [(4, [2.0, 2.0, 0.0]), (5, [3.0, 0.0, 0.0]), (6, [5.0, 1.0, 0.0]), (7, [5.0, 5.0, 5.0])];
    for (id, [x, y, z]) in solid {
        model.add_node(Node::solid(id, Point3::new(x, y, z))).unwrap();
    }
    model.add_group("hub", [1]).unwrap();
    model.add_group("rim", [2, 3]).unwrap();
    model.add_group("slider", [4]).unwrap();
    model.add_group("pairs", [5, 6]).unwrap();
    model.add_group("anchors", [1, 5]).unwrap();
    model.add_group("target", [7]).unwrap();
    model
}

/// Tridiagonal, diagonally dominant stiffness of springs between consecutive equations.
fn chain_stiffness(n: usize) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(n, n);
    for i in 0..n {
        coo.push(i, i, 4.0);
        if i + 1 < n {
            coo.push(i, i + 1, -1.0);
            coo.push(i + 1, i, -1.0);
        }
    }
    CsrMatrix::from(&coo)
}

#[test]
fn process_list_produces_solvable_constrained_system() {
    let mut model = mixed_model();
    let processes = ProcessSettings::list_from_json_str(PROCESS_LIST).unwrap();
    let registry = BuilderRegistry::with_builtin_builders();
    let ranges = registry.apply_all(&processes, &mut model).unwrap();

    let counts: Vec<_> = ranges.iter().map(|range| range.len()).collect();
    assert_eq!(counts, [24, 1, 1, 6]);
    assert_eq!(ranges.last().unwrap().end, 33);

    let numbering = DofNumbering::from_model(&model);
    assert_eq!(numbering.len(), 3 * 6 + 4 * 3);
    let relation = RelationMatrix::from_constraints(&numbering, model.constraints()).unwrap();
    // Six per rim node, one for the slider, one for the pair and three for the target
    assert_eq!(relation.slaves().len(), 17);

    let n = numbering.len();
    let k = chain_stiffness(n);
    let f = DVector::from_fn(n, |i, _| (i % 5) as f64 - 2.0);

    // Solve the reduced system on the master equations
    let reduced = DMatrix::from(&relation.reduce(&k).unwrap());
    let rhs = relation.matrix().transpose() * (&f - &k * relation.constants());
    let free: Vec<_> = (0..n).filter(|i| !relation.is_slave(*i)).collect();
    let k_free = reduced.select_rows(&free).select_columns(&free);
    let rhs_free = rhs.select_rows(&free);
    let u_free = k_free
        .cholesky()
        .expect("reduced stiffness is positive definite")
        .solve(&rhs_free);
    let mut u_reduced = DVector::zeros(n);
    for (value, &i) in u_free.iter().zip(&free) {
        u_reduced[i] = *value;
    }
    let u = relation.expand(&u_reduced).unwrap();

    // Every slave equals the sum of the relations of its constraints
    let mut expected_slaves: FxHashMap<usize, f64> = FxHashMap::default();
    for constraint in model.constraints() {
        let slave = numbering.equation_id(&constraint.slave()).unwrap();
        let value = constraint.evaluate(|dof| u[numbering.equation_id(dof).unwrap()]);
        *expected_slaves.entry(slave).or_default() += value;
    }
    assert_eq!(expected_slaves.len(), 17);
    for (slave, expected) in expected_slaves {
        assert!((u[slave] - expected).abs() <= 1e-12, "slave {}: {} vs {}", slave, u[slave], expected);
    }

    // The constrained residual vanishes
    let residual = relation.matrix().transpose() * (&k * &u - &f);
    assert!(residual.amax() <= 1e-10, "residual {:e}", residual.amax());

    let graph = ConstraintGraph::from_model(&model);
    let names = graph.group_names(&SerialCommunicator);
    assert!(names.contains("DISPLACEMENT_X_DISPLACEMENT_Y"));
    assert!(names.contains("ROTATION_Z_ROTATION_Z"));
}

#[test]
fn unknown_process_aborts_whole_list() {
    let mut model = mixed_model();
    let mut processes = ProcessSettings::list_from_json_str(PROCESS_LIST).unwrap();
    processes.push(ProcessSettings::new("RBE9Process", serde_json::json!({})));

    let registry = BuilderRegistry::with_builtin_builders();
    let error = registry.apply_all(&processes, &mut model).unwrap_err();
    assert_eq!(error, Error::UnknownFactoryTag("RBE9Process".to_string()));
    assert!(model.constraints().is_empty());
}

#[test]
fn repeated_process_lists_continue_ids() {
    let mut model = mixed_model();
    let processes = ProcessSettings::list_from_json_str(PROCESS_LIST).unwrap();
    let registry = BuilderRegistry::with_builtin_builders();
    let first = registry.apply_all(&processes[..1], &mut model).unwrap();
    let second = registry.apply_all(&processes[1..], &mut model).unwrap();
    assert_eq!(first[0], 1..25);
    assert_eq!(second[0].start, 25);
    assert_eq!(model.constraints().len(), 32);
}
