//! Quadrature rules for the reference segment and the reference triangle.
use crate::basis::BasisKind;
use crate::{Error, Real};
use fenris_quadrature::{polyquad, univariate};
use nalgebra::convert;

/// A quadrature rule on a reference domain.
///
/// Points are stored flattened, `dim` coordinates per point.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrature<T> {
    dim: usize,
    weights: Vec<T>,
    points: Vec<T>,
}

impl<T: Real> Quadrature<T> {
    /// # Panics
    ///
    /// Panics if the number of point coordinates does not match `dim * weights.len()`.
    pub fn from_parts(dim: usize, weights: Vec<T>, points: Vec<T>) -> Self {
        assert_eq!(points.len(), dim * weights.len(), "each point must have `dim` coordinates");
        Self { dim, weights, points }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn point(&self, index: usize) -> &[T] {
        &self.points[self.dim * index..self.dim * (index + 1)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (T, &[T])> {
        self.weights
            .iter()
            .copied()
            .zip(self.points.chunks_exact(self.dim.max(1)))
    }

    /// Approximates the integral of `f` over the reference domain.
    pub fn integrate(&self, f: impl Fn(&[T]) -> T) -> T {
        self.iter().fold(T::zero(), |integral, (w, xi)| integral + w * f(xi))
    }
}

fn convert_quadrature_rule_from_f64<T, const D: usize>(rule: fenris_quadrature::Rule<D>) -> Quadrature<T>
where
    T: Real,
{
    let (weights, points) = rule;
    let weights = weights.into_iter().map(convert).collect();
    let points = points.into_iter().flatten().map(convert).collect();
    Quadrature::from_parts(D, weights, points)
}

/// Gauss-Legendre rule with `num_points` points on `[-1, 1]`.
///
/// Integrates polynomials of degree up to `2 num_points - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss<T: Real>(num_points: usize) -> Quadrature<T> {
    convert_quadrature_rule_from_f64(univariate::gauss(num_points))
}

/// Rule on the reference triangle with corners (-1, -1), (1, -1), (-1, 1) that integrates
/// polynomials of total degree up to `strength` exactly.
pub fn triangle<T: Real>(strength: usize) -> Result<Quadrature<T>, Error> {
    let rule = polyquad::triangle(strength)
        .map_err(|err| Error::configuration(format!("no triangle rule of strength {}: {}", strength, err)))?;
    Ok(convert_quadrature_rule_from_f64(rule))
}

/// A rule on the reference domain of `kind` that integrates products of gradients of its basis
/// functions exactly.
pub fn stiffness_quadrature<T: Real>(kind: BasisKind) -> Result<Quadrature<T>, Error> {
    let p = kind.polynomial_order();
    match kind.reference_dim() {
        1 => Ok(gauss(p)),
        _ => triangle(usize::max(2 * (p - 1), 1)),
    }
}
