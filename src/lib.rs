//! Multi-point constraints and hierarchical restriction operators.
//!
//! The crate has two halves that meet in the [`consistency`] harness:
//!
//! - The constraint half: a structural container ([`model::Model`]) owning nodes, node groups and
//!   linear master-slave [`constraint::Constraint`]s, the builders that emit those constraints
//!   (RBE2, RBE3, generic multi-freedom constraints, surface sliding and node links), and the
//!   [`relation::RelationMatrix`] that eliminates slave degrees of freedom from an assembled system.
//! - The hierarchical half: Lagrange reference bases ([`basis`]) and the restriction operators
//!   ([`restriction`]) mapping fine-level nodal vectors onto coarse-level ones.
use nalgebra::RealField;

pub mod allocator;
pub mod assembly;
pub mod basis;
pub mod builders;
pub mod communicator;
pub mod consistency;
pub mod constraint;
pub mod dof;
pub mod error;
pub mod graph;
pub mod model;
pub mod quadrature;
pub mod registry;
pub mod relation;
pub mod restriction;
pub mod settings;

#[cfg(feature = "proptest")]
pub mod proptest;

pub use error::Error;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

/// Scalar types usable by the generic numerical routines of this crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Identifier of a node in a [`model::Model`].
pub type NodeId = usize;

/// Identifier of a constraint, unique within its owning [`model::Model`].
pub type ConstraintId = usize;
