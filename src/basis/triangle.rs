use crate::basis::ReferenceBasis;
use crate::Real;
use nalgebra::{convert, DMatrixViewMut, Vector2};
use numeric_literals::replace_float_literals;

/// Barycentric coordinates of the reference triangle with corners (-1, -1), (1, -1), (-1, 1).
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn barycentric<T: Real>(xi: &[T]) -> [T; 3] {
    let (x, y) = (xi[0], xi[1]);
    [-0.5 * (x + y), 0.5 * (x + 1.0), 0.5 * (y + 1.0)]
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn barycentric_gradients<T: Real>() -> [Vector2<T>; 3] {
    [Vector2::new(-0.5, -0.5), Vector2::new(0.5, 0.0), Vector2::new(0.0, 0.5)]
}

/// Writes the reference coordinates of nodes given in barycentric coordinates scaled by `denom`.
fn populate_from_barycentric<T: Real>(coords: &mut [T], nodes: &[[u8; 3]], denom: f64) {
    assert_eq!(coords.len(), 2 * nodes.len());
    for (coord, lambda) in coords.chunks_exact_mut(2).zip(nodes) {
        let [l0, l1, l2] = lambda.map(|l| f64::from(l) / denom);
        coord[0] = convert(-l0 + l1 - l2);
        coord[1] = convert(-l0 - l1 + l2);
    }
}

fn write_gradients<T: Real>(mut output: DMatrixViewMut<T>, columns: &[Vector2<T>]) {
    assert_eq!(output.shape(), (2, columns.len()));
    for (i, column) in columns.iter().enumerate() {
        output.set_column(i, column);
    }
}

/// Linear basis on the reference triangle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tri3Basis;

/// Quadratic basis on the reference triangle.
///
/// Vertices come first, then the midpoints of the edges 0-1, 1-2 and 0-2.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tri6Basis;

/// Cubic basis on the reference triangle.
///
/// Vertices come first, then two nodes on each of the edges 0-1, 1-2 and 2-0 (the node closer to
/// the first vertex of the edge first), and finally the centroid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tri10Basis;

const TRI3_NODES: [[u8; 3]; 3] = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];
const TRI6_NODES: [[u8; 3]; 6] = [[2, 0, 0], [0, 2, 0], [0, 0, 2], [1, 1, 0], [0, 1, 1], [1, 0, 1]];
const TRI10_NODES: [[u8; 3]; 10] = [
    [3, 0, 0],
    [0, 3, 0],
    [0, 0, 3],
    [2, 1, 0],
    [1, 2, 0],
    [0, 2, 1],
    [0, 1, 2],
    [1, 0, 2],
    [2, 0, 1],
    [1, 1, 1],
];

/// Edges of the cubic triangle, in node order. The first index is the vertex the edge node is
/// closest to.
const TRI10_EDGE_NODES: [(usize, usize); 6] = [(0, 1), (1, 0), (1, 2), (2, 1), (2, 0), (0, 2)];

impl<T: Real> ReferenceBasis<T> for Tri3Basis {
    fn reference_dim(&self) -> usize {
        2
    }

    fn num_nodes(&self) -> usize {
        3
    }

    fn polynomial_order(&self) -> usize {
        1
    }

    fn populate_node_coords(&self, coords: &mut [T]) {
        populate_from_barycentric(coords, &TRI3_NODES, 1.0);
    }

    fn populate_basis(&self, values: &mut [T], xi: &[T]) {
        values.copy_from_slice(&barycentric(xi));
    }

    fn populate_basis_gradients(&self, gradients: DMatrixViewMut<T>, _xi: &[T]) {
        write_gradients(gradients, &barycentric_gradients());
    }
}

impl<T: Real> ReferenceBasis<T> for Tri6Basis {
    fn reference_dim(&self) -> usize {
        2
    }

    fn num_nodes(&self) -> usize {
        6
    }

    fn polynomial_order(&self) -> usize {
        2
    }

    fn populate_node_coords(&self, coords: &mut [T]) {
        populate_from_barycentric(coords, &TRI6_NODES, 2.0);
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis(&self, values: &mut [T], xi: &[T]) {
        let l = barycentric(xi);
        values.copy_from_slice(&[
            l[0] * (2.0 * l[0] - 1.0),
            l[1] * (2.0 * l[1] - 1.0),
            l[2] * (2.0 * l[2] - 1.0),
            4.0 * l[0] * l[1],
            4.0 * l[1] * l[2],
            4.0 * l[0] * l[2],
        ]);
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis_gradients(&self, gradients: DMatrixViewMut<T>, xi: &[T]) {
        let l = barycentric(xi);
        let g = barycentric_gradients::<T>();
        let vertex = |i: usize| g[i] * (4.0 * l[i] - 1.0);
        let edge = |i: usize, j: usize| g[i] * (4.0 * l[j]) + g[j] * (4.0 * l[i]);
        write_gradients(
            gradients,
            &[vertex(0), vertex(1), vertex(2), edge(0, 1), edge(1, 2), edge(0, 2)],
        );
    }
}

impl<T: Real> ReferenceBasis<T> for Tri10Basis {
    fn reference_dim(&self) -> usize {
        2
    }

    fn num_nodes(&self) -> usize {
        10
    }

    fn polynomial_order(&self) -> usize {
        3
    }

    fn populate_node_coords(&self, coords: &mut [T]) {
        populate_from_barycentric(coords, &TRI10_NODES, 3.0);
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis(&self, values: &mut [T], xi: &[T]) {
        assert_eq!(values.len(), 10);
        let l = barycentric(xi);
        for i in 0..3 {
            values[i] = 0.5 * l[i] * (3.0 * l[i] - 1.0) * (3.0 * l[i] - 2.0);
        }
        for (k, &(i, j)) in TRI10_EDGE_NODES.iter().enumerate() {
            values[3 + k] = 4.5 * l[i] * l[j] * (3.0 * l[i] - 1.0);
        }
        values[9] = 27.0 * l[0] * l[1] * l[2];
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis_gradients(&self, gradients: DMatrixViewMut<T>, xi: &[T]) {
        let l = barycentric(xi);
        let g = barycentric_gradients::<T>();

        let mut columns = [Vector2::zeros(); 10];
        for i in 0..3 {
            columns[i] = g[i] * (0.5 * (27.0 * l[i] * l[i] - 18.0 * l[i] + 2.0));
        }
        for (k, &(i, j)) in TRI10_EDGE_NODES.iter().enumerate() {
            let d_i = 4.5 * l[j] * (6.0 * l[i] - 1.0);
            let d_j = 4.5 * l[i] * (3.0 * l[i] - 1.0);
            columns[3 + k] = g[i] * d_i + g[j] * d_j;
        }
        columns[9] = (g[0] * (l[1] * l[2]) + g[1] * (l[0] * l[2]) + g[2] * (l[0] * l[1])) * 27.0;
        write_gradients(gradients, &columns);
    }
}
