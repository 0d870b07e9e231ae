//! Elimination of slave degrees of freedom from assembled systems.
//!
//! A set of constraints `u_s = Σ c_i u_m_i + b_s` is expressed as `u = Rel u + b`, where the
//! relation matrix `Rel` is the identity except in slave rows, which hold the coefficients of the
//! slave's masters, and `b` holds the constants in slave rows. A stiffness matrix `K` is reduced
//! to the constrained system `Relᵀ K Rel`.
use crate::constraint::Constraint;
use crate::dof::DofRef;
use crate::model::Model;
use crate::Error;
use itertools::Itertools;
use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rustc_hash::FxHashMap;

/// Global equation numbering of the degrees of freedom of a model.
///
/// Nodes are numbered in order of increasing id, and the degrees of freedom of a node in the
/// declaration order of [`Variable`](crate::dof::Variable).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DofNumbering {
    dofs: Vec<DofRef>,
    equation_ids: FxHashMap<DofRef, usize>,
}

impl DofNumbering {
    pub fn from_model(model: &Model) -> Self {
        let dofs: Vec<_> = model
            .nodes()
            .flat_map(|node| node.dofs().map(move |variable| DofRef::new(node.id(), variable)))
            .collect();
        let equation_ids = dofs.iter().enumerate().map(|(i, dof)| (*dof, i)).collect();
        Self { dofs, equation_ids }
    }

    pub fn len(&self) -> usize {
        self.dofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dofs.is_empty()
    }

    pub fn dofs(&self) -> &[DofRef] {
        &self.dofs
    }

    pub fn equation_id(&self, dof: &DofRef) -> Result<usize, Error> {
        self.equation_ids
            .get(dof)
            .copied()
            .ok_or_else(|| Error::model_state(format!("degree of freedom {} has no equation id", dof)))
    }
}

/// The relation matrix of a set of constraints, together with the constant vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationMatrix {
    matrix: CsrMatrix<f64>,
    constants: DVector<f64>,
    slaves: Vec<usize>,
}

impl RelationMatrix {
    /// The relation matrix of a system without constraints.
    pub fn identity(size: usize) -> Self {
        Self {
            matrix: CsrMatrix::identity(size),
            constants: DVector::zeros(size),
            slaves: Vec::new(),
        }
    }

    /// Builds the relation matrix of model constraints.
    ///
    /// Coefficients and constants of constraints sharing a slave are summed. A master that is the
    /// slave of another constraint cannot be eliminated in one step and is rejected.
    pub fn from_constraints(numbering: &DofNumbering, constraints: &[Constraint]) -> Result<Self, Error> {
        let mut triplets = Vec::new();
        let mut slaves = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            let slave = numbering.equation_id(&constraint.slave())?;
            for (master, coefficient) in constraint.masters() {
                triplets.push((numbering.equation_id(master)?, slave, *coefficient));
            }
            slaves.push(slave);
        }

        let mut relation = Self::assemble(numbering.len(), &triplets, slaves.clone())?;
        for (constraint, slave) in constraints.iter().zip(slaves) {
            relation.constants[slave] += constraint.constant();
        }
        debug!(
            "Relation matrix of size {} eliminates {} slave dofs",
            relation.size(),
            relation.slaves.len()
        );
        Ok(relation)
    }

    /// Builds a relation matrix from `(master, slave, coefficient)` triplets of equation ids.
    pub fn from_triplets(size: usize, triplets: &[(usize, usize, f64)]) -> Result<Self, Error> {
        let slaves = triplets.iter().map(|(_, slave, _)| *slave).collect();
        Self::assemble(size, triplets, slaves)
    }

    /// Builds a relation matrix tying each slave to a master with unit coefficient.
    ///
    /// The lists pair up element-wise. Their lengths must agree, and no index may be both a master
    /// and a slave.
    pub fn from_index_pairs(size: usize, masters: &[usize], slaves: &[usize]) -> Result<Self, Error> {
        if masters.len() != slaves.len() {
            return Err(Error::configuration(format!(
                "master count ({}) must match slave count ({})",
                masters.len(),
                slaves.len()
            )));
        }
        for (master, slave) in masters.iter().zip(slaves) {
            if slaves.contains(master) {
                return Err(Error::configuration(format!("master {} is also a slave", master)));
            }
            if masters.contains(slave) {
                return Err(Error::configuration(format!("slave {} is also a master", slave)));
            }
        }
        let triplets: Vec<_> = masters
            .iter()
            .zip(slaves)
            .map(|(&master, &slave)| (master, slave, 1.0))
            .collect();
        Self::from_triplets(size, &triplets)
    }

    fn assemble(size: usize, triplets: &[(usize, usize, f64)], slaves: Vec<usize>) -> Result<Self, Error> {
        let out_of_bounds = triplets
            .iter()
            .flat_map(|(master, slave, _)| [*master, *slave])
            .chain(slaves.iter().copied())
            .find(|index| *index >= size);
        if let Some(index) = out_of_bounds {
            return Err(Error::configuration(format!(
                "equation id {} is out of bounds for a system of size {}",
                index, size
            )));
        }

        let slaves: Vec<usize> = slaves.into_iter().sorted_unstable().dedup().collect();
        if let Some((master, _, _)) = triplets
            .iter()
            .find(|(master, _, _)| slaves.binary_search(master).is_ok())
        {
            return Err(Error::configuration(format!("master {} is also a slave", master)));
        }

        let mut coo = CooMatrix::new(size, size);
        for i in (0..size).filter(|i| slaves.binary_search(i).is_err()) {
            coo.push(i, i, 1.0);
        }
        for &(master, slave, coefficient) in triplets {
            coo.push(slave, master, coefficient);
        }

        Ok(Self {
            matrix: CsrMatrix::from(&coo),
            constants: DVector::zeros(size),
            slaves,
        })
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    pub fn constants(&self) -> &DVector<f64> {
        &self.constants
    }

    /// Equation ids of the slave degrees of freedom, sorted.
    pub fn slaves(&self) -> &[usize] {
        &self.slaves
    }

    pub fn is_slave(&self, equation_id: usize) -> bool {
        self.slaves.binary_search(&equation_id).is_ok()
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        DMatrix::from(&self.matrix)
    }

    /// Computes `Relᵀ K Rel`.
    pub fn reduce(&self, stiffness: &CsrMatrix<f64>) -> Result<CsrMatrix<f64>, Error> {
        self.check_system_size(stiffness.nrows(), stiffness.ncols())?;
        let transposed = self.matrix.transpose();
        Ok(&(&transposed * stiffness) * &self.matrix)
    }

    /// Computes `Relᵀ K Rel` for a dense stiffness matrix.
    pub fn reduce_dense(&self, stiffness: &DMatrix<f64>) -> Result<DMatrix<f64>, Error> {
        self.check_system_size(stiffness.nrows(), stiffness.ncols())?;
        let relation = self.to_dense();
        Ok(relation.transpose() * stiffness * relation)
    }

    /// Recovers the full solution `Rel u + b` from a solution of the reduced system.
    ///
    /// Slave entries of `u` are ignored.
    pub fn expand(&self, u: &DVector<f64>) -> Result<DVector<f64>, Error> {
        self.check_system_size(u.len(), self.size())?;
        Ok(&self.matrix * u + &self.constants)
    }

    fn check_system_size(&self, rows: usize, cols: usize) -> Result<(), Error> {
        if rows != self.size() || cols != self.size() {
            return Err(Error::configuration(format!(
                "system of shape {}x{} does not match relation matrix of size {}",
                rows,
                cols,
                self.size()
            )));
        }
        Ok(())
    }
}
