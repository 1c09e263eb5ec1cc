//! Ordinary least squares for `rainfall ≈ b0 + b1·year + b2·month`.
//!
//! Features are centered and the least-squares system is solved through an
//! SVD. Singular values that are negligible relative to the largest one are
//! dropped, which yields the minimum-norm solution: when a feature is
//! constant over the training data (a single year, say) its coefficient
//! comes out as zero and the intercept absorbs the mean.

use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest are treated as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// One training observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingPoint {
    pub year: f64,
    pub month: f64,
    pub rainfall_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub year_coef: f64,
    pub month_coef: f64,
}

impl LinearModel {
    /// Fit on the given points, skipping any with a non-finite value.
    /// Returns `None` when nothing usable is left.
    pub fn fit(points: &[TrainingPoint]) -> Option<Self> {
        let usable: Vec<&TrainingPoint> = points
            .iter()
            .filter(|p| p.year.is_finite() && p.month.is_finite() && p.rainfall_mm.is_finite())
            .collect();
        if usable.is_empty() {
            return None;
        }

        let n = usable.len() as f64;
        let mean_year = usable.iter().map(|p| p.year).sum::<f64>() / n;
        let mean_month = usable.iter().map(|p| p.month).sum::<f64>() / n;
        let mean_rain = usable.iter().map(|p| p.rainfall_mm).sum::<f64>() / n;

        let design = DMatrix::from_fn(usable.len(), 2, |i, j| match j {
            0 => usable[i].year - mean_year,
            _ => usable[i].month - mean_month,
        });
        let target = DVector::from_iterator(
            usable.len(),
            usable.iter().map(|p| p.rainfall_mm - mean_rain),
        );

        let (year_coef, month_coef) = solve_min_norm(design, &target);
        let intercept = mean_rain - year_coef * mean_year - month_coef * mean_month;

        Some(Self {
            intercept,
            year_coef,
            month_coef,
        })
    }

    pub fn predict(&self, year: f64, month: f64) -> f64 {
        self.intercept + self.year_coef * year + self.month_coef * month
    }
}

/// Minimum-norm least-squares coefficients of the centered n x 2 system.
fn solve_min_norm(design: DMatrix<f64>, target: &DVector<f64>) -> (f64, f64) {
    let svd = design.svd(true, true);
    let largest = svd.singular_values.max();
    // all-zero design: every feature is constant
    if largest <= 0.0 {
        return (0.0, 0.0);
    }

    match svd.solve(target, largest * RANK_TOLERANCE) {
        Ok(coef) => (coef[0], coef[1]),
        Err(_) => (0.0, 0.0),
    }
}
