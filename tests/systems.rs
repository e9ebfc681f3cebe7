use ndarray::prelude::*;

use ndarray_rkf45::systems::{logistic_bifurcation, Lorenz};

#[test]
fn lorenz_rhs_at_unit_state() {
    let lorenz = Lorenz::default();
    let y = array![1., 1., 1.];
    let mut dy = Array1::zeros(3);
    lorenz.rhs(0., y.view(), dy.view_mut());
    assert_eq!(dy[0], 0.);
    assert_eq!(dy[1], 26.);
    assert!((dy[2] - (1. - 8. / 3.)).abs() < 1e-15);
}

#[test]
fn logistic_map_settles_on_fixed_point() {
    // Below r = 3 the attractor is the fixed point x* = 1 - 1/r.
    let (r, kept) = logistic_bifurcation(2.5, 2.5, 1, 500, 10);
    assert_eq!(r[0], 2.5);
    assert!(kept.iter().all(|&x| (x - 0.6).abs() < 1e-9));
}

#[test]
fn logistic_map_two_cycle_past_first_bifurcation() {
    let (_r, kept) = logistic_bifurcation(3.2, 3.2, 1, 2000, 8);
    let column: Vec<f64> = kept.column(0).to_vec();

    // Period-two orbit of the logistic map at r = 3.2.
    let lo = 0.5130445095326298;
    let hi = 0.7994554904673702;
    for pair in column.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            ((a - lo).abs() < 1e-6 && (b - hi).abs() < 1e-6)
                || ((a - hi).abs() < 1e-6 && (b - lo).abs() < 1e-6),
            "not on the two-cycle: {} -> {}",
            a,
            b
        );
    }
}

#[test]
fn bifurcation_grid_shape_and_range() {
    let (r, kept) = logistic_bifurcation(2.5, 4.0, 64, 200, 50);
    assert_eq!(r.len(), 64);
    assert_eq!(kept.dim(), (50, 64));
    assert_eq!(r[0], 2.5);
    assert_eq!(r[63], 4.0);
    // Population ratios stay inside the unit interval for r <= 4.
    assert!(kept.iter().all(|&x| (0. ..=1.).contains(&x)));
}
