//! The structural container owning nodes, node groups and constraints.
use crate::allocator::IdAllocator;
use crate::builders::ConstraintBuilder;
use crate::constraint::{validate_batch, Constraint};
use crate::dof::{DofCapability, DofRef, Variable};
use crate::{ConstraintId, Error, NodeId};
use log::{debug, info};
use nalgebra::{Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Selects which nodal positions geometric quantities are computed from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Configuration {
    /// The initial, undeformed positions.
    Reference,
    /// The positions after the latest mesh update.
    Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    reference_position: Point3<f64>,
    current_position: Point3<f64>,
    dofs: BTreeSet<Variable>,
}

impl Node {
    /// Creates a node without any degrees of freedom.
    pub fn new(id: NodeId, position: Point3<f64>) -> Self {
        Self {
            id,
            reference_position: position,
            current_position: position,
            dofs: BTreeSet::new(),
        }
    }

    pub fn with_dofs(mut self, dofs: impl IntoIterator<Item = Variable>) -> Self {
        self.dofs.extend(dofs);
        self
    }

    /// A node carrying the three displacements, as allocated by solid elements.
    pub fn solid(id: NodeId, position: Point3<f64>) -> Self {
        Self::new(id, position).with_dofs(Variable::DISPLACEMENTS)
    }

    /// A node carrying displacements and rotations, as allocated by shell and beam elements.
    pub fn structural(id: NodeId, position: Point3<f64>) -> Self {
        Self::new(id, position).with_dofs(Variable::ALL)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn reference_position(&self) -> &Point3<f64> {
        &self.reference_position
    }

    pub fn current_position(&self) -> &Point3<f64> {
        &self.current_position
    }

    pub fn position(&self, configuration: Configuration) -> &Point3<f64> {
        match configuration {
            Configuration::Reference => &self.reference_position,
            Configuration::Current => &self.current_position,
        }
    }

    /// Moves the node to its reference position plus the given displacement.
    pub fn set_displacement(&mut self, displacement: &Vector3<f64>) {
        self.current_position = self.reference_position + displacement;
    }

    pub fn add_dof(&mut self, variable: Variable) {
        self.dofs.insert(variable);
    }

    pub fn has_dof(&self, variable: Variable) -> bool {
        self.dofs.contains(&variable)
    }

    /// The variables allocated on this node, in equation order.
    pub fn dofs(&self) -> impl Iterator<Item = Variable> + '_ {
        self.dofs.iter().copied()
    }
}

/// A named, ordered, non-owning set of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
    name: String,
    nodes: Vec<NodeId>,
}

impl NodeGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns the only node of the group.
    ///
    /// Fails with a configuration error unless the group has exactly one node. `role` names the
    /// group's role in the error message, e.g. "independent".
    pub fn single_node(&self, role: &str) -> Result<NodeId, Error> {
        match self.nodes.as_slice() {
            [node] => Ok(*node),
            nodes => Err(Error::configuration(format!(
                "{} node group '{}' needs to have exactly 1 node, but has {}",
                role,
                self.name,
                nodes.len()
            ))),
        }
    }
}

/// The root structural container.
///
/// Owns the nodes, the node groups referencing them and every constraint registered so far.
/// Constraints are only ever added through [`Model::apply`] or [`Model::add_constraints`], which
/// register a whole batch or nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    nodes: BTreeMap<NodeId, Node>,
    groups: FxHashMap<String, NodeGroup>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), Error> {
        if node.id() == 0 {
            return Err(Error::configuration("node ids must be positive"));
        }
        if self.nodes.contains_key(&node.id()) {
            return Err(Error::model_state(format!("node {} already exists", node.id())));
        }
        self.nodes.insert(node.id(), node);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::model_state(format!("node {} does not exist in the model", id)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| Error::model_state(format!("node {} does not exist in the model", id)))
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Declares a node group. Every member must already exist in the model.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<&NodeGroup, Error> {
        let name = name.into();
        if self.groups.contains_key(&name) {
            return Err(Error::configuration(format!("node group '{}' is declared twice", name)));
        }

        let mut seen = FxHashSet::default();
        let mut members = Vec::new();
        for node in nodes {
            self.node(node)?;
            // Groups are sets, duplicates are dropped while keeping the first occurrence
            if seen.insert(node) {
                members.push(node);
            }
        }

        let group = NodeGroup {
            name: name.clone(),
            nodes: members,
        };
        Ok(self.groups.entry(name).or_insert(group))
    }

    pub fn group(&self, name: &str) -> Result<&NodeGroup, Error> {
        self.groups
            .get(name)
            .ok_or_else(|| Error::model_state(format!("node group '{}' does not exist in the model", name)))
    }

    /// Names of all node groups, sorted.
    pub fn group_names(&self) -> BTreeSet<String> {
        self.groups.keys().cloned().collect()
    }

    /// Queries whether the node carries the given variable.
    ///
    /// Fails only if the node itself is missing.
    pub fn dof_capability(&self, node: NodeId, variable: Variable) -> Result<DofCapability, Error> {
        Ok(self.node(node)?.has_dof(variable).into())
    }

    /// Fails with a model state error unless the degree of freedom exists.
    pub fn require_dof(&self, dof: &DofRef) -> Result<(), Error> {
        match self.dof_capability(dof.node, dof.variable)? {
            DofCapability::Present => Ok(()),
            DofCapability::Absent => Err(Error::model_state(format!(
                "node {} has no {} degree of freedom",
                dof.node, dof.variable
            ))),
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.iter().find(|constraint| constraint.id() == id)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Constraint> {
        let index = self.constraints.iter().position(|constraint| constraint.id() == id)?;
        Some(self.constraints.remove(index))
    }

    /// Registers a batch of constraints.
    ///
    /// The batch is validated as a whole before anything is registered: ids must be fresh, every
    /// referenced degree of freedom must exist and the master/slave sets of the batch must be
    /// disjoint.
    pub fn add_constraints(&mut self, batch: Vec<Constraint>) -> Result<(), Error> {
        validate_batch(&batch)?;
        let ids_in_use: FxHashSet<ConstraintId> = self.constraints.iter().map(Constraint::id).collect();
        for constraint in &batch {
            if ids_in_use.contains(&constraint.id()) {
                return Err(Error::configuration(format!(
                    "constraint id {} is already in use",
                    constraint.id()
                )));
            }
            self.require_dof(&constraint.slave())?;
            for (master, _) in constraint.masters() {
                self.require_dof(master)?;
            }
        }
        self.constraints.extend(batch);
        Ok(())
    }

    /// Runs a builder against this model and registers the constraints it produces.
    ///
    /// Returns the range of ids assigned to the new constraints. If the builder or the validation
    /// of its batch fails, the model is left unchanged.
    pub fn apply(&mut self, builder: &dyn ConstraintBuilder) -> Result<Range<ConstraintId>, Error> {
        let mut ids = IdAllocator::from_model(self);
        let first = ids.peek();
        let batch = builder.build(self, &mut ids)?;
        debug!("{} produced {} constraints", builder.name(), batch.len());
        self.add_constraints(batch)?;
        let range = first..ids.peek();
        info!(
            "Registered {} constraints from {} (ids {}..{})",
            range.len(),
            builder.name(),
            range.start,
            range.end
        );
        Ok(range)
    }
}
