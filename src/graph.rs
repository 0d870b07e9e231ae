//! A graph view of the constraints of a model, meant for visualisation.
//!
//! Every non-zero master coefficient of a constraint becomes an edge between the slave node and
//! the master node. Edges are keyed by the unordered node pair together with the unordered pair
//! of constrained variables, and grouped by the variable pair, so that for example all
//! `DISPLACEMENT_X`–`ROTATION_Y` couplings of a rigid link end up in one group.
use crate::communicator::{union_across_ranks, Communicator};
use crate::dof::Variable;
use crate::model::Model;
use crate::{ConstraintId, NodeId};
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

/// An unordered pair, stored with its smaller element first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymmetricPair<T>(T, T);

impl<T: Ord> SymmetricPair<T> {
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn first(&self) -> &T {
        &self.0
    }

    pub fn second(&self) -> &T {
        &self.1
    }
}

/// Name of the edge group holding couplings between the two variables.
pub fn variable_pair_name(variables: &SymmetricPair<Variable>) -> String {
    let a = variables.first().name();
    let b = variables.second().name();
    format!("{}_{}", a.min(b), a.max(b))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintEdge {
    pub id: usize,
    /// The slave node and the master node, in that order.
    pub nodes: [NodeId; 2],
    pub variables: SymmetricPair<Variable>,
    /// The constraint the edge was created for.
    pub constraint: ConstraintId,
    /// The master coefficient of the most recent constraint mapped onto this edge.
    pub scale: f64,
}

impl ConstraintEdge {
    pub fn group_name(&self) -> String {
        variable_pair_name(&self.variables)
    }
}

type EdgeKey = (SymmetricPair<NodeId>, SymmetricPair<Variable>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintGraph {
    edges: BTreeMap<EdgeKey, ConstraintEdge>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_model(model: &Model) -> Self {
        let mut graph = Self::new();
        graph.update(model);
        graph
    }

    /// Synchronises the graph with the constraints currently held by the model.
    ///
    /// Edges whose constraint no longer exists are removed, edges for new couplings are created
    /// with fresh ids, and the scale of every edge is refreshed.
    pub fn update(&mut self, model: &Model) {
        let live: FxHashSet<ConstraintId> = model.constraints().iter().map(|c| c.id()).collect();
        self.edges.retain(|_, edge| live.contains(&edge.constraint));

        let mut next_id = self.edges.values().map(|edge| edge.id).max().map_or(1, |id| id + 1);
        for constraint in model.constraints() {
            let slave = constraint.slave();
            for (master, coefficient) in constraint.masters() {
                if *coefficient == 0.0 {
                    continue;
                }
                let key = (
                    SymmetricPair::new(slave.node, master.node),
                    SymmetricPair::new(slave.variable, master.variable),
                );
                let edge = self.edges.entry(key).or_insert_with(|| {
                    let edge = ConstraintEdge {
                        id: next_id,
                        nodes: [slave.node, master.node],
                        variables: key.1,
                        constraint: constraint.id(),
                        scale: *coefficient,
                    };
                    next_id += 1;
                    edge
                });
                edge.scale = *coefficient;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = &ConstraintEdge> {
        self.edges.values()
    }

    /// Edges of one variable-pair group, ordered by edge id.
    pub fn group(&self, name: &str) -> Vec<&ConstraintEdge> {
        let mut edges: Vec<_> = self
            .edges
            .values()
            .filter(|edge| edge.group_name() == name)
            .collect();
        edges.sort_by_key(|edge| edge.id);
        edges
    }

    /// Names of the groups with at least one edge on this rank.
    pub fn local_group_names(&self) -> BTreeSet<String> {
        self.edges.values().map(ConstraintEdge::group_name).collect()
    }

    /// Names of the groups with at least one edge on any rank.
    ///
    /// Output groups must be declared identically on every rank, including ranks that hold no
    /// edge of a group.
    pub fn group_names(&self, communicator: &dyn Communicator) -> BTreeSet<String> {
        union_across_ranks(&self.local_group_names(), communicator)
    }
}
