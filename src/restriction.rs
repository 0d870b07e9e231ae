//! Restriction operators between nested Lagrange bases.
//!
//! The restriction from a fine to a coarse basis on the same reference element has entries
//! `R[a, i] = φ_a(x_i)`, the coarse basis function `a` evaluated at the fine node `i`. Its
//! transpose is the prolongation, which interpolates a coarse nodal vector at the fine nodes.
//! Since the coarse space is contained in the fine space whenever the coarse order does not
//! exceed the fine order, the prolongation is exact and restrictions compose:
//! `R(fine → coarse) = R(mid → coarse) R(fine → mid)`.
use crate::basis::{BasisKind, ReferenceBasis};
use crate::{Error, Real};
use log::debug;
use nalgebra::DMatrix;

/// Restriction operator between two reference bases, of shape `coarse nodes x fine nodes`.
pub fn restriction_between<T: Real>(
    fine: &dyn ReferenceBasis<T>,
    coarse: &dyn ReferenceBasis<T>,
) -> Result<DMatrix<T>, Error> {
    let dim = fine.reference_dim();
    if dim != coarse.reference_dim() {
        return Err(Error::configuration(format!(
            "cannot restrict a basis of reference dimension {} to one of reference dimension {}",
            dim,
            coarse.reference_dim()
        )));
    }

    let fine_coords = fine.node_coords();
    let mut restriction = DMatrix::zeros(coarse.num_nodes(), fine.num_nodes());
    let mut values = vec![T::zero(); coarse.num_nodes()];
    for (i, xi) in fine_coords.as_slice().chunks_exact(dim).enumerate() {
        coarse.populate_basis(&mut values, xi);
        for (a, value) in values.iter().enumerate() {
            restriction[(a, i)] = *value;
        }
    }
    Ok(restriction)
}

/// Restriction operator from the `fine` to the `coarse` basis.
///
/// Bases with different reference dimensions are rejected with a configuration error.
pub fn build_restriction<T: Real>(fine: BasisKind, coarse: BasisKind) -> Result<DMatrix<T>, Error> {
    debug!("Building restriction operator {:?} -> {:?}", fine, coarse);
    restriction_between(&*fine.to_basis::<T>(), &*coarse.to_basis::<T>())
}

/// Composes the restrictions between consecutive levels, ordered from finest to coarsest.
pub fn chain_restrictions<T: Real>(levels: &[BasisKind]) -> Result<DMatrix<T>, Error> {
    let first = levels
        .first()
        .ok_or_else(|| Error::configuration("a restriction chain needs at least one level"))?;
    let mut chained = DMatrix::identity(first.num_nodes(), first.num_nodes());
    for pair in levels.windows(2) {
        chained = build_restriction::<T>(pair[0], pair[1])? * chained;
    }
    Ok(chained)
}

/// Largest absolute entry of the difference between the direct restriction `fine → coarse` and
/// the restriction chained through `mid`.
pub fn transitivity_error<T: Real>(fine: BasisKind, mid: BasisKind, coarse: BasisKind) -> Result<T, Error> {
    let direct = build_restriction::<T>(fine, coarse)?;
    let chained = chain_restrictions::<T>(&[fine, mid, coarse])?;
    Ok((direct - chained).amax())
}

/// For every coarse node, the index of the fine node at the same reference coordinates.
///
/// Coarse nodes that are not fine nodes yield `None`.
pub fn node_embedding(fine: BasisKind, coarse: BasisKind) -> Result<Vec<Option<usize>>, Error> {
    let dim = fine.reference_dim();
    if dim != coarse.reference_dim() {
        return Err(Error::configuration(format!(
            "bases {:?} and {:?} live on different reference elements",
            fine, coarse
        )));
    }
    let fine_coords = fine.to_basis::<f64>().node_coords();
    let coarse_coords = coarse.to_basis::<f64>().node_coords();
    let embedding = coarse_coords
        .as_slice()
        .chunks_exact(dim)
        .map(|x_coarse| {
            fine_coords.as_slice().chunks_exact(dim).position(|x_fine| {
                x_fine
                    .iter()
                    .zip(x_coarse)
                    .all(|(a, b)| (a - b).abs() <= 1e-12)
            })
        })
        .collect();
    Ok(embedding)
}

/// Block-diagonal operator with `count` copies of `block`.
pub fn block_diagonal<T: Real>(block: &DMatrix<T>, count: usize) -> DMatrix<T> {
    let (r, c) = block.shape();
    let mut result = DMatrix::zeros(r * count, c * count);
    for k in 0..count {
        result.view_mut((k * r, k * c), (r, c)).copy_from(block);
    }
    result
}
