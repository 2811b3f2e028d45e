//! Bounded-random coordinate offset.
//!
//! Submitting the exact same coordinates every day is a recognizable
//! fingerprint, so a small uniform perturbation is applied before each
//! submission. The magnitude is operator-configurable per user.

use rand::Rng;

/// Default offset magnitude (~2 m at the equator).
pub const DEFAULT_OFFSET: f64 = 0.000020;

/// Perturb a decimal coordinate string by a uniform offset in
/// `[-offset, +offset]`, rendered with six decimal places.
///
/// A zero offset or an unparseable coordinate passes the input through
/// untouched, so the portal sees exactly what the operator configured.
pub fn apply_offset<R: Rng>(coordinate: &str, offset: f64, rng: &mut R) -> String {
    if offset == 0.0 {
        return coordinate.to_string();
    }
    let Ok(base) = coordinate.trim().parse::<f64>() else {
        return coordinate.to_string();
    };
    let jitter = rng.gen_range(-offset..=offset);
    format!("{:.6}", base + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_offset_is_the_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(apply_offset("20.000000", 0.0, &mut rng), "20.000000");
        assert_eq!(apply_offset("20.1234567", 0.0, &mut rng), "20.1234567");
    }

    #[test]
    fn unparseable_coordinates_pass_through() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(apply_offset("not-a-number", 0.5, &mut rng), "not-a-number");
        assert_eq!(apply_offset("", 0.5, &mut rng), "");
    }

    #[test]
    fn perturbed_value_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let offset = 0.000020;
        // Six-decimal rounding can move the rendered value by at most 5e-7.
        let tolerance = 1e-6;
        for _ in 0..200 {
            let out: f64 = apply_offset("20.000000", offset, &mut rng).parse().unwrap();
            assert!(out >= 20.0 - offset - tolerance, "below bound: {out}");
            assert!(out <= 20.0 + offset + tolerance, "above bound: {out}");
        }
    }

    #[test]
    fn output_has_six_decimal_places() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = apply_offset("100.000000", 0.5, &mut rng);
        let decimals = out.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 6);
    }
}
