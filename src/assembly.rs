//! Assembly of Laplace stiffness matrices on reference elements.
use crate::basis::{BasisKind, ReferenceBasis};
use crate::quadrature::{stiffness_quadrature, Quadrature};
use crate::restriction::block_diagonal;
use crate::{Error, Real};
use nalgebra::DMatrix;

/// Element stiffness matrix `K_ij = ∫ ∇φ_i · ∇φ_j` of a basis on its reference element.
///
/// # Panics
///
/// Panics if the dimension of the quadrature does not match the reference dimension of the basis.
#[allow(non_snake_case)]
pub fn assemble_element_stiffness<T: Real>(basis: &dyn ReferenceBasis<T>, quadrature: &Quadrature<T>) -> DMatrix<T> {
    assert_eq!(
        basis.reference_dim(),
        quadrature.dim(),
        "quadrature must live on the reference element of the basis"
    );
    let n = basis.num_nodes();
    let mut K = DMatrix::zeros(n, n);
    let mut G = DMatrix::zeros(basis.reference_dim(), n);
    for (w, xi) in quadrature.iter() {
        basis.populate_basis_gradients(G.view_mut((0, 0), G.shape()), xi);
        K.gemm_tr(w, &G, &G, T::one());
    }
    K
}

/// Reference stiffness matrix of the given basis, integrated exactly.
pub fn reference_stiffness<T: Real>(kind: BasisKind) -> Result<DMatrix<T>, Error> {
    let quadrature = stiffness_quadrature(kind)?;
    Ok(assemble_element_stiffness(&*kind.to_basis::<T>(), &quadrature))
}

/// System matrix of `element_count` identical elements that share no nodes.
///
/// Element `e` owns the global degrees of freedom `e * n..(e + 1) * n`, where `n` is the number
/// of nodes of the element. Couplings between elements are introduced through constraints only.
pub fn assemble_disconnected<T: Real>(element_matrix: &DMatrix<T>, element_count: usize) -> DMatrix<T> {
    block_diagonal(element_matrix, element_count)
}
