//! Linear master-slave constraints.
use crate::dof::DofRef;
use crate::{ConstraintId, Error};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A linear relation `slave = sum_i coefficient_i * master_i + constant`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    id: ConstraintId,
    masters: Vec<(DofRef, f64)>,
    slave: DofRef,
    constant: f64,
}

impl Constraint {
    pub fn new(id: ConstraintId, masters: Vec<(DofRef, f64)>, slave: DofRef, constant: f64) -> Self {
        Self {
            id,
            masters,
            slave,
            constant,
        }
    }

    /// A constraint with a single master, `slave = coefficient * master + constant`.
    pub fn single(id: ConstraintId, master: DofRef, slave: DofRef, coefficient: f64, constant: f64) -> Self {
        Self::new(id, vec![(master, coefficient)], slave, constant)
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn masters(&self) -> &[(DofRef, f64)] {
        &self.masters
    }

    pub fn slave(&self) -> DofRef {
        self.slave
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Evaluates the right-hand side of the relation for the given master values.
    pub fn evaluate(&self, master_value: impl Fn(&DofRef) -> f64) -> f64 {
        self.masters
            .iter()
            .map(|(dof, coefficient)| coefficient * master_value(dof))
            .sum::<f64>()
            + self.constant
    }
}

/// Checks the invariants of a batch of constraints created in one builder invocation.
///
/// Ids must be positive and distinct, and no degree of freedom may be the slave of one constraint
/// while being a master of another (or the same) constraint in the batch.
pub fn validate_batch(batch: &[Constraint]) -> Result<(), Error> {
    let mut ids = FxHashSet::default();
    let mut slaves = FxHashSet::default();
    for constraint in batch {
        if constraint.id() == 0 {
            return Err(Error::configuration("constraint ids must be positive"));
        }
        if !ids.insert(constraint.id()) {
            return Err(Error::configuration(format!(
                "constraint id {} is used more than once",
                constraint.id()
            )));
        }
        slaves.insert(constraint.slave());
    }

    for constraint in batch {
        for (master, _) in constraint.masters() {
            if slaves.contains(master) {
                return Err(Error::configuration(format!(
                    "{} is a master in constraint {} but also a slave in the same batch",
                    master,
                    constraint.id()
                )));
            }
        }
    }
    Ok(())
}
