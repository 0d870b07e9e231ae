//! Allocation of constraint ids.
use crate::constraint::Constraint;
use crate::model::Model;
use crate::ConstraintId;

/// Returns the first free constraint id of the model: one past the largest id in use, or `1` if
/// the model holds no constraints.
pub fn first_free_id(model: &Model) -> ConstraintId {
    first_free_id_among(model.constraints())
}

pub fn first_free_id_among<'a>(constraints: impl IntoIterator<Item = &'a Constraint>) -> ConstraintId {
    constraints
        .into_iter()
        .map(Constraint::id)
        .max()
        .map(|id| id + 1)
        .unwrap_or(1)
}

/// Hands out consecutive constraint ids for one builder invocation.
///
/// The allocator is seeded once from the container and then counts locally, so every
/// constraint of a batch receives a distinct id. Builders sharing a container must run one
/// after the other, each with a freshly seeded allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: ConstraintId,
}

impl IdAllocator {
    /// Allocator whose first id is `first`.
    ///
    /// # Panics
    ///
    /// Panics if `first` is zero, since constraint ids are positive.
    pub fn starting_at(first: ConstraintId) -> Self {
        assert!(first > 0, "constraint ids are positive");
        Self { next: first }
    }

    pub fn from_model(model: &Model) -> Self {
        Self::starting_at(first_free_id(model))
    }

    /// The id the next call to [`IdAllocator::next_id`] returns.
    pub fn peek(&self) -> ConstraintId {
        self.next
    }

    pub fn next_id(&mut self) -> ConstraintId {
        let id = self.next;
        self.next += 1;
        id
    }
}
