// Host-side tests for the Fibonacci-sphere card layout.

use gallery_core::{card_position, shell_radius};

#[test]
fn positions_are_deterministic() {
    for n in [1usize, 2, 3, 7, 48, 500] {
        for i in 0..n {
            let a = card_position(n, i);
            let b = card_position(n, i);
            // Bit-identical, not merely close.
            assert_eq!(a.to_array(), b.to_array(), "n={n} i={i}");
        }
    }
}

#[test]
fn shell_radii_partition_indices() {
    for i in 0..100 {
        let r = shell_radius(i);
        let expected = match i % 3 {
            0 => 35.0,
            1 => 43.0,
            _ => 51.0,
        };
        assert_eq!(r, expected, "index {i}");
    }
}

#[test]
fn positions_sit_on_their_shell() {
    let n = 24;
    for i in 0..n {
        let p = card_position(n, i);
        let r = shell_radius(i);
        assert!(
            (p.length() - r).abs() < 1e-3,
            "index {i}: |p|={} expected {r}",
            p.length()
        );
    }
}

#[test]
fn single_item_sits_on_polar_axis() {
    let p = card_position(1, 0);
    // phi = acos(-1) = pi, so the position is straight down the -Z axis.
    assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
    assert!((p.z + 35.0).abs() < 1e-3);
}

#[test]
fn no_two_cards_share_a_position() {
    let n = 60;
    let positions: Vec<_> = (0..n).map(|i| card_position(n, i)).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            assert!(
                (positions[i] - positions[j]).length() > 0.5,
                "cards {i} and {j} overlap"
            );
        }
    }
}
