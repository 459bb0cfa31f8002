//! Kernel density estimation for violin-style rendering.
//!
//! The estimator computes a one-sided Epanechnikov KDE over `[0, max]`,
//! prepends a synthetic `(0, 0)` point, then mirrors the whole sequence
//! (reversed, densities negated) and concatenates the two halves. The
//! result is point-symmetric about density 0. This is a rendering
//! convention, not a two-sided statistical estimate.

use crate::models::{CurvePoint, DensityDisplay, DistributionCurve};

/// Smallest sample that still gets a curve; below this the caller must
/// fall back to plotting the raw points.
pub const MIN_DENSITY_SAMPLE: usize = 6;

/// Default smoothing bandwidth shared by all violin charts.
pub const DEFAULT_BANDWIDTH: f64 = 2.0;

/// Evaluation grid resolution over the domain.
const GRID_INTERVALS: usize = 40;

fn epanechnikov(bandwidth: f64, distance: f64) -> f64 {
    let u = distance / bandwidth;
    if u.abs() <= 1.0 {
        0.75 * (1.0 - u * u) / bandwidth
    } else {
        0.0
    }
}

/// Estimate the mirrored density curve for `values` (already restricted to
/// `> 0` by the caller). With fewer than `MIN_DENSITY_SAMPLE` values the
/// result is `Points`, a rendering-mode switch rather than an error.
pub fn estimate_density(values: &[f64], bandwidth: f64, domain_max: f64) -> DensityDisplay {
    if values.len() < MIN_DENSITY_SAMPLE {
        return DensityDisplay::Points(values.to_vec());
    }

    let mut points = Vec::with_capacity(2 * (GRID_INTERVALS + 2));
    points.push(CurvePoint { x: 0.0, y: 0.0 });
    for i in 0..=GRID_INTERVALS {
        let x = domain_max * i as f64 / GRID_INTERVALS as f64;
        let y = values
            .iter()
            .map(|v| epanechnikov(bandwidth, x - v))
            .sum::<f64>()
            / values.len() as f64;
        points.push(CurvePoint { x, y });
    }

    let mirror: Vec<CurvePoint> = points
        .iter()
        .rev()
        .map(|p| CurvePoint { x: p.x, y: -p.y })
        .collect();
    points.extend(mirror);

    DensityDisplay::Curve(DistributionCurve { points })
}

/// Running maximum density across all groups sharing one chart, so every
/// curve renders on the same visual scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct KdeMaxTracker {
    max: f64,
}

impl KdeMaxTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, density: &DensityDisplay) {
        if let DensityDisplay::Curve(curve) = density {
            self.max = self.max.max(curve.max_density());
        }
    }

    pub fn value(&self) -> f64 {
        self.max
    }
}
