//! Builders emitting batches of constraints from node groups and geometric parameters.
//!
//! Every builder follows the same contract: it reads the model, draws ids from the
//! [`IdAllocator`] it is handed, and returns the complete batch. Nothing is registered by the
//! builder itself; [`Model::apply`](crate::model::Model::apply) validates and registers the
//! batch as a whole, so a failing builder never leaves a partial constraint set behind.
use crate::allocator::IdAllocator;
use crate::constraint::Constraint;
use crate::model::Model;
use crate::Error;
use std::fmt::Debug;

mod distributing_link;
mod multifreedom;
mod node_link;
mod rigid_link;
mod surface_sliding;

pub use distributing_link::*;
pub use multifreedom::*;
pub use node_link::*;
pub use rigid_link::*;
pub use surface_sliding::*;

/// A producer of master-slave constraints.
pub trait ConstraintBuilder: Debug {
    /// A short human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Builds the constraints of this builder for the current state of the model.
    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error>;
}

impl<B: ConstraintBuilder + ?Sized> ConstraintBuilder for Box<B> {
    fn name(&self) -> &str {
        B::name(self)
    }

    fn build(&self, model: &Model, ids: &mut IdAllocator) -> Result<Vec<Constraint>, Error> {
        B::build(self, model, ids)
    }
}

/// Fails unless every named group exists in the model.
fn ensure_groups_exist<'a>(model: &Model, names: impl IntoIterator<Item = &'a str>) -> Result<(), Error> {
    for name in names {
        model.group(name)?;
    }
    Ok(())
}
