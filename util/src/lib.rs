//! Test helpers shared by the test crates of the workspace.
use nalgebra::{DMatrix, RealField};

/// Asserts that the largest absolute entry of `x - y` does not exceed `abstol`.
///
/// Both matrices are passed by reference. Prints both matrices and their difference on failure.
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let x = $x;
        let y = $y;
        assert_eq!(x.shape(), y.shape(), "matrix shapes differ");
        let diff = x - y;
        let max_absdiff = diff.amax();
        if !(max_absdiff <= $tol) {
            println!("abstol: {:e}", $tol);
            println!("left: {}", x);
            println!("right: {}", y);
            println!("diff: {:e}", diff);
            panic!("matrices differ by {:e} in max norm", max_absdiff);
        }
    }};
}

/// Asserts that evaluating the expression panics.
#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        let result = std::panic::catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", std::stringify!($e));
        }
    }};
}

/// Relative Frobenius distance `|x - y| / |y|`, or the absolute distance if `y` vanishes.
pub fn relative_frobenius_distance<T: RealField + Copy>(x: &DMatrix<T>, y: &DMatrix<T>) -> T {
    let distance = (x - y).norm();
    let reference = y.norm();
    if reference > T::zero() {
        distance / reference
    } else {
        distance
    }
}
