use autospector_core::geom::{pct, BoxError, NormBox, PercentRect};
use proptest::prelude::*;

#[test]
fn full_grid_box_covers_the_whole_container() {
    let r = NormBox::from_slice(&[0, 0, 1000, 1000]).unwrap().to_percent();
    assert_eq!(
        PercentRect {
            top: 0.0,
            left: 0.0,
            width: 100.0,
            height: 100.0
        },
        r
    );
}

#[test]
fn centered_box_occupies_middle_half() {
    let r = NormBox::from_slice(&[250, 250, 750, 750]).unwrap().to_percent();
    assert_eq!(25.0, r.top);
    assert_eq!(25.0, r.left);
    assert_eq!(50.0, r.width);
    assert_eq!(50.0, r.height);
}

#[test]
fn percent_rect_resolves_against_any_container_size() {
    let r = NormBox::new(250, 100, 750, 600).to_percent();
    let small = r.to_pixels(640.0, 480.0);
    assert!((small.x - 64.0).abs() < 1e-9);
    assert!((small.y - 120.0).abs() < 1e-9);
    assert!((small.width - 320.0).abs() < 1e-9);
    assert!((small.height - 240.0).abs() < 1e-9);

    let big = r.to_pixels(4000.0, 3000.0);
    assert!((big.x - 400.0).abs() < 1e-9);
    assert!((big.height - 1500.0).abs() < 1e-9);
}

#[test]
fn strict_parse_rejects_invariant_violations() {
    assert_eq!(Err(BoxError::WrongArity(3)), NormBox::from_slice(&[1, 2, 3]));
    assert_eq!(
        Err(BoxError::OutOfRange([0, 0, 1200, 500])),
        NormBox::from_slice(&[0, 0, 1200, 500])
    );
    assert_eq!(
        Err(BoxError::Degenerate([500, 0, 500, 100])),
        NormBox::from_slice(&[500, 0, 500, 100])
    );
}

#[test]
fn clamped_keeps_boxes_that_leave_the_grid() {
    let b = NormBox::clamped(&[-20, 900, 300, 1100]).unwrap();
    assert_eq!([0, 900, 300, 1000], b.to_array());
}

#[test]
fn repaired_swaps_reversed_edges() {
    let (b, changed) = NormBox::repaired(&[600, 700, 400, 100]).unwrap();
    assert!(changed);
    assert_eq!([400, 100, 600, 700], b.to_array());

    let (_, changed) = NormBox::repaired(&[1, 2, 3, 4]).unwrap();
    assert!(!changed);
}

proptest! {
    #[test]
    fn pct_is_a_tenth(v in 0i64..=1000) {
        prop_assert!((pct(v) * 10.0 - v as f64).abs() < 1e-9);
    }

    #[test]
    fn valid_boxes_stay_inside_the_container(
        ymin in 0i64..1000, xmin in 0i64..1000, dy in 1i64..1000, dx in 1i64..1000
    ) {
        let ymax = (ymin + dy).min(1000);
        let xmax = (xmin + dx).min(1000);
        prop_assume!(ymax > ymin && xmax > xmin);
        let r = NormBox::from_slice(&[ymin, xmin, ymax, xmax]).unwrap().to_percent();
        prop_assert!(r.top >= 0.0 && r.left >= 0.0);
        prop_assert!(r.bottom() <= 100.0 + 1e-9);
        prop_assert!(r.right() <= 100.0 + 1e-9);
        prop_assert!(r.width > 0.0 && r.height > 0.0);
    }
}
