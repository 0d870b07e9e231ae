//! Consistency of constraint elimination with hierarchical restriction.
//!
//! A two-level solver restricts the constrained fine system onto a coarse level. For this to be
//! sound, the restricted fine system must coincide with the constrained coarse system. With `Q`
//! and `L` the relation matrices of the fine and coarse levels and `R` the unconstrained
//! restriction, the constrained restriction is `R_c = Lᵀ R Qᵀ`, and the check compares
//! `R_c (Qᵀ K_f Q) R_cᵀ` against `Lᵀ K_c L`.
//!
//! Coarse relations are derived from the fine ones through the node embedding: a fine constraint
//! between fine nodes that coincide with coarse nodes becomes the same constraint between those
//! coarse nodes. Constraints on fine nodes without a coarse counterpart cannot be represented on
//! the coarse level and are rejected.
use crate::assembly::{assemble_disconnected, reference_stiffness};
use crate::basis::BasisKind;
use crate::relation::RelationMatrix;
use crate::restriction::{block_diagonal, build_restriction, node_embedding};
use eyre::{eyre, WrapErr};
use log::info;
use nalgebra::DMatrix;

/// A chain of `element_count` identical, initially disconnected elements on two levels, coupled by
/// constraints between fine degrees of freedom.
///
/// Degrees of freedom are numbered element by element: element `e` owns the fine degrees of
/// freedom `e * n_f..(e + 1) * n_f` and the coarse degrees of freedom `e * n_c..(e + 1) * n_c`,
/// in the node order of the respective bases.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyCheck {
    pub fine: BasisKind,
    pub coarse: BasisKind,
    pub element_count: usize,
    /// `(master, slave, coefficient)` triplets of fine degrees of freedom.
    pub constraints: Vec<(usize, usize, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    /// The constrained restriction `R_c = Lᵀ R Qᵀ`.
    pub constrained_restriction: DMatrix<f64>,
    /// The restricted fine system `R_c (Qᵀ K_f Q) R_cᵀ`.
    pub restricted: DMatrix<f64>,
    /// The constrained coarse system `Lᵀ K_c L`.
    pub coarse: DMatrix<f64>,
    /// Frobenius norm of the difference between the restricted and the coarse system.
    pub absolute_error: f64,
    /// `absolute_error` relative to the Frobenius norm of the coarse system.
    pub relative_error: f64,
}

impl ConsistencyReport {
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.relative_error <= tolerance
    }
}

impl ConsistencyCheck {
    pub fn new(fine: BasisKind, coarse: BasisKind, element_count: usize) -> Self {
        Self {
            fine,
            coarse,
            element_count,
            constraints: Vec::new(),
        }
    }

    /// Adds the constraint `u[slave] = coefficient * u[master]` between fine degrees of freedom.
    pub fn with_constraint(mut self, master: usize, slave: usize, coefficient: f64) -> Self {
        self.constraints.push((master, slave, coefficient));
        self
    }

    /// For every fine degree of freedom, the coarse degree of freedom at the same node, if any.
    pub fn fine_to_coarse(&self) -> eyre::Result<Vec<Option<usize>>> {
        let embedding = node_embedding(self.fine, self.coarse)
            .wrap_err_with(|| format!("failed to embed {:?} into {:?}", self.coarse, self.fine))?;
        let (n_f, n_c) = (self.fine.num_nodes(), self.coarse.num_nodes());
        let mut fine_to_coarse = vec![None; n_f * self.element_count];
        for e in 0..self.element_count {
            for (a, fine_node) in embedding.iter().enumerate() {
                if let Some(i) = fine_node {
                    fine_to_coarse[e * n_f + i] = Some(e * n_c + a);
                }
            }
        }
        Ok(fine_to_coarse)
    }

    /// The constraints of the coarse level, derived through the node embedding.
    pub fn coarse_constraints(&self) -> eyre::Result<Vec<(usize, usize, f64)>> {
        let fine_to_coarse = self.fine_to_coarse()?;
        let coarse_dof = |fine_dof: usize| {
            fine_to_coarse
                .get(fine_dof)
                .copied()
                .flatten()
                .ok_or_else(|| eyre!("constrained fine dof {} has no coarse counterpart", fine_dof))
        };
        self.constraints
            .iter()
            .map(|&(master, slave, coefficient)| {
                Ok::<_, eyre::Report>((coarse_dof(master)?, coarse_dof(slave)?, coefficient))
            })
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn check(&self) -> eyre::Result<ConsistencyReport> {
        let n = self.element_count;
        if n == 0 {
            return Err(eyre!("consistency check needs at least one element"));
        }

        let R_element = build_restriction::<f64>(self.fine, self.coarse)
            .wrap_err("failed to build the unconstrained restriction operator")?;
        let R = block_diagonal(&R_element, n);
        let K_f = assemble_disconnected(&reference_stiffness::<f64>(self.fine)?, n);
        let K_c = assemble_disconnected(&reference_stiffness::<f64>(self.coarse)?, n);

        let Q = RelationMatrix::from_triplets(K_f.nrows(), &self.constraints)
            .wrap_err("invalid fine level constraints")?
            .to_dense();
        let L = RelationMatrix::from_triplets(K_c.nrows(), &self.coarse_constraints()?)
            .wrap_err("invalid coarse level constraints")?
            .to_dense();

        let R_c = L.transpose() * &R * Q.transpose();
        let restricted = &R_c * (Q.transpose() * &K_f * &Q) * R_c.transpose();
        let coarse = L.transpose() * &K_c * &L;

        let absolute_error = (&restricted - &coarse).norm();
        let reference_norm = coarse.norm();
        let relative_error = if reference_norm > 0.0 {
            absolute_error / reference_norm
        } else {
            absolute_error
        };
        info!(
            "Restriction {:?} -> {:?} over {} elements with {} constraints: relative error {:e}",
            self.fine,
            self.coarse,
            n,
            self.constraints.len(),
            relative_error
        );

        Ok(ConsistencyReport {
            constrained_restriction: R_c,
            restricted,
            coarse,
            absolute_error,
            relative_error,
        })
    }
}
