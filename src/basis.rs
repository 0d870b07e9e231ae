//! Lagrange bases on reference elements.
//!
//! Reference elements follow the usual conventions of this crate: segments live on `[-1, 1]`
//! and triangles are spanned by the corners `(-1, -1)`, `(1, -1)` and `(-1, 1)`. Each basis
//! has exactly one node per basis function, and basis function `i` is one at node `i` and zero
//! at every other node.
use crate::Real;
use nalgebra::{DMatrix, DMatrixViewMut, DVector};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

mod segment;
mod triangle;

pub use segment::*;
pub use triangle::*;

/// A nodal basis on a reference element.
///
/// The methods write into caller-provided storage so that the trait remains object safe and
/// evaluation does not allocate.
pub trait ReferenceBasis<T: Real>: Debug {
    fn reference_dim(&self) -> usize;

    fn num_nodes(&self) -> usize;

    /// Total polynomial degree of the basis functions.
    fn polynomial_order(&self) -> usize;

    /// Writes the reference coordinates of every node, node by node.
    ///
    /// `coords` must have length `num_nodes() * reference_dim()`.
    fn populate_node_coords(&self, coords: &mut [T]);

    /// Writes the value of every basis function at `xi` into `values`.
    fn populate_basis(&self, values: &mut [T], xi: &[T]);

    /// Writes the reference gradient of every basis function at `xi`.
    ///
    /// The output has shape `reference_dim() x num_nodes()`, one column per basis function.
    fn populate_basis_gradients(&self, gradients: DMatrixViewMut<T>, xi: &[T]);

    /// Node coordinates as the columns of a `reference_dim() x num_nodes()` matrix.
    fn node_coords(&self) -> DMatrix<T> {
        let mut coords = DMatrix::zeros(self.reference_dim(), self.num_nodes());
        self.populate_node_coords(coords.as_mut_slice());
        coords
    }

    fn evaluate(&self, xi: &[T]) -> DVector<T> {
        let mut values = DVector::zeros(self.num_nodes());
        self.populate_basis(values.as_mut_slice(), xi);
        values
    }

    fn gradients(&self, xi: &[T]) -> DMatrix<T> {
        let shape = (self.reference_dim(), self.num_nodes());
        let mut gradients = DMatrix::zeros(shape.0, shape.1);
        self.populate_basis_gradients(gradients.view_mut((0, 0), shape), xi);
        gradients
    }
}

/// The reference bases available to restriction operators and assembly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasisKind {
    Line2,
    Line3,
    Line4,
    Tri3,
    Tri6,
    Tri10,
}

impl BasisKind {
    pub const ALL: [BasisKind; 6] = [
        BasisKind::Line2,
        BasisKind::Line3,
        BasisKind::Line4,
        BasisKind::Tri3,
        BasisKind::Tri6,
        BasisKind::Tri10,
    ];

    pub fn reference_dim(&self) -> usize {
        match self {
            Self::Line2 | Self::Line3 | Self::Line4 => 1,
            Self::Tri3 | Self::Tri6 | Self::Tri10 => 2,
        }
    }

    pub fn polynomial_order(&self) -> usize {
        match self {
            Self::Line2 | Self::Tri3 => 1,
            Self::Line3 | Self::Tri6 => 2,
            Self::Line4 | Self::Tri10 => 3,
        }
    }

    pub fn num_nodes(&self) -> usize {
        let p = self.polynomial_order();
        match self.reference_dim() {
            1 => p + 1,
            _ => (p + 1) * (p + 2) / 2,
        }
    }

    /// The basis of the same element family with the given polynomial order, if available.
    pub fn with_order(&self, order: usize) -> Option<BasisKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.reference_dim() == self.reference_dim() && kind.polynomial_order() == order)
    }

    pub fn to_basis<T: Real>(&self) -> Box<dyn ReferenceBasis<T>> {
        match self {
            Self::Line2 => Box::new(LagrangeSegment::linear()),
            Self::Line3 => Box::new(LagrangeSegment::quadratic()),
            Self::Line4 => Box::new(LagrangeSegment::cubic()),
            Self::Tri3 => Box::new(Tri3Basis),
            Self::Tri6 => Box::new(Tri6Basis),
            Self::Tri10 => Box::new(Tri10Basis),
        }
    }
}
