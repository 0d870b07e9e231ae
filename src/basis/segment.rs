use crate::basis::ReferenceBasis;
use crate::Real;
use nalgebra::{convert, DMatrixViewMut};

/// Lagrange basis of arbitrary order on the reference segment `[-1, 1]`.
///
/// The two end points come first, followed by the interior nodes in increasing order. The
/// interior nodes are equispaced, so the quadratic basis has its third node at `0` and the cubic
/// basis has its interior nodes at `-1/3` and `1/3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LagrangeSegment {
    order: usize,
}

impl LagrangeSegment {
    /// # Panics
    ///
    /// Panics if the order is zero.
    pub fn new(order: usize) -> Self {
        assert!(order > 0, "segment basis order must be positive");
        Self { order }
    }

    pub fn linear() -> Self {
        Self::new(1)
    }

    pub fn quadratic() -> Self {
        Self::new(2)
    }

    pub fn cubic() -> Self {
        Self::new(3)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    fn node<T: Real>(&self, i: usize) -> T {
        let p = self.order;
        match i {
            0 => -T::one(),
            1 => T::one(),
            k => convert::<f64, T>(-1.0 + 2.0 * (k - 1) as f64 / p as f64),
        }
    }

    /// Product of `(x - x_j) / (x_i - x_j)` over all nodes `j` except `i` and `skip`.
    fn partial_product<T: Real>(&self, i: usize, skip: Option<usize>, x: T) -> T {
        let x_i = self.node::<T>(i);
        (0..=self.order)
            .filter(|&j| j != i && Some(j) != skip)
            .map(|j| {
                let x_j = self.node::<T>(j);
                (x - x_j) / (x_i - x_j)
            })
            .fold(T::one(), |acc, factor| acc * factor)
    }
}

impl<T: Real> ReferenceBasis<T> for LagrangeSegment {
    fn reference_dim(&self) -> usize {
        1
    }

    fn num_nodes(&self) -> usize {
        self.order + 1
    }

    fn polynomial_order(&self) -> usize {
        self.order
    }

    fn populate_node_coords(&self, coords: &mut [T]) {
        assert_eq!(coords.len(), self.order + 1);
        for (i, coord) in coords.iter_mut().enumerate() {
            *coord = self.node(i);
        }
    }

    fn populate_basis(&self, values: &mut [T], xi: &[T]) {
        assert_eq!(values.len(), self.order + 1);
        let x = xi[0];
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.partial_product(i, None, x);
        }
    }

    fn populate_basis_gradients(&self, mut gradients: DMatrixViewMut<T>, xi: &[T]) {
        assert_eq!(gradients.shape(), (1, self.order + 1));
        let x = xi[0];
        for i in 0..=self.order {
            let x_i = self.node::<T>(i);
            // Product rule: differentiate one factor at a time
            gradients[(0, i)] = (0..=self.order)
                .filter(|&m| m != i)
                .map(|m| self.partial_product(i, Some(m), x) / (x_i - self.node::<T>(m)))
                .fold(T::zero(), |acc, term| acc + term);
        }
    }
}
