/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation used by demos and tests.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_gravmag_utils::PointSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a set of random points scattered over a horizontal area.
///
/// # Parameters
/// - `n`: Number of points to generate.
/// - `area`: Horizontal extents `[xmin, xmax, ymin, ymax]`.
/// - `z_range`: Inclusive `(zmin, zmax)` range of point heights; pass the
///   same value twice for a constant-height layer.
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same points will be generated
///     deterministically across runs and platforms (useful for reproducible
///     tests).
///   - If `None`, the generator is seeded from the operating system's
///     randomness source.
///
/// # Returns
/// A [`PointSet`] of `n` points within the requested extents.
///
/// # Example
/// ```
/// use ferreus_gravmag::generate_scattered_points;
///
/// // Generate 100 reproducible points on a flat layer at z = 50
/// let points = generate_scattered_points(100, [-50.0, 50.0, -50.0, 50.0], (50.0, 50.0), Some(42));
/// assert_eq!(points.len(), 100);
/// assert!(points.z.iter().all(|&z| z == 50.0));
/// ```
pub fn generate_scattered_points(
    n: usize,
    area: [f64; 4],
    z_range: (f64, f64),
    seed: Option<u64>,
) -> PointSet {
    let mut rng = match seed.is_some() {
        true => StdRng::seed_from_u64(seed.unwrap()),
        false => StdRng::from_os_rng(),
    };

    let mut sample = |low: f64, high: f64| -> Vec<f64> {
        (0..n)
            .map(|_| match low == high {
                true => low,
                false => rng.random_range(low..high),
            })
            .collect()
    };

    let x = sample(area[0], area[1]);
    let y = sample(area[2], area[3]);
    let z = sample(z_range.0, z_range.1);

    PointSet { x, y, z }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_scattered_points(25, [0.0, 1.0, 2.0, 3.0], (4.0, 5.0), Some(7));
        let b = generate_scattered_points(25, [0.0, 1.0, 2.0, 3.0], (4.0, 5.0), Some(7));
        assert_eq!(a, b);
    }

    #[test]
    fn points_respect_the_requested_extents() {
        let points = generate_scattered_points(200, [-10.0, 10.0, 5.0, 6.0], (0.0, 2.0), Some(1));
        assert!(points.x.iter().all(|&x| (-10.0..10.0).contains(&x)));
        assert!(points.y.iter().all(|&y| (5.0..6.0).contains(&y)));
        assert!(points.z.iter().all(|&z| (0.0..2.0).contains(&z)));
    }
}
