use crate::model::{PredictionRow, RiskLevel, StationRecord};
use crate::regression::{LinearModel, TrainingPoint};
use crate::selection::FilterSelection;
use tracing::debug;

/// Trend model fitted on one region's full station history.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionModel {
    pub region: String,
    pub model: LinearModel,
    pub training_points: usize,
}

/// Result of a prediction pass.
///
/// `Empty` means no selected region had training data (or the evaluation
/// grid was empty). It is an informational state, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Predictions(Vec<PredictionRow>),
    Empty,
}

impl PredictionOutcome {
    pub fn rows(&self) -> &[PredictionRow] {
        match self {
            PredictionOutcome::Predictions(rows) => rows,
            PredictionOutcome::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PredictionOutcome::Empty)
    }
}

/// A region's predicted rainfall by month, in prediction-row order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub region: String,
    pub points: Vec<(u32, f64)>,
}

/// Fit one model per region, in the given order. Regions without any
/// usable station rows are skipped.
pub fn fit_region_models(stations: &[StationRecord], regions: &[String]) -> Vec<RegionModel> {
    let mut models = Vec::with_capacity(regions.len());

    for region in regions {
        let points: Vec<TrainingPoint> = stations
            .iter()
            .filter(|s| &s.region == region)
            .map(|s| TrainingPoint {
                year: f64::from(s.year),
                month: f64::from(s.month),
                rainfall_mm: s.rainfall_mm,
            })
            .collect();

        if points.is_empty() {
            debug!("No station data for region {}, skipping", region);
            continue;
        }

        let Some(model) = LinearModel::fit(&points) else {
            debug!("No usable training pairs for region {}, skipping", region);
            continue;
        };

        debug!(
            "Fitted {} on {} points: rainfall = {:.3} + {:.3}*year + {:.3}*month",
            region,
            points.len(),
            model.intercept,
            model.year_coef,
            model.month_coef
        );

        models.push(RegionModel {
            region: region.clone(),
            model,
            training_points: points.len(),
        });
    }

    models
}

/// Predict rainfall and flood risk for every selected region over the
/// selected years × months grid.
///
/// `stations` should be the full loaded table: each region's model is
/// trained on its whole history, not on the year/month-filtered rows.
pub fn predict(stations: &[StationRecord], selection: &FilterSelection) -> PredictionOutcome {
    let months = selection.month_ordinals();
    let grid: Vec<(i32, u32)> = selection
        .years
        .iter()
        .flat_map(|&year| months.iter().map(move |&month| (year, month)))
        .collect();

    let mut rows = Vec::new();
    for region_model in fit_region_models(stations, &selection.regions) {
        rows.extend(grid.iter().map(|&(year, month)| {
            let predicted = region_model
                .model
                .predict(f64::from(year), f64::from(month));
            PredictionRow {
                year,
                month,
                region: region_model.region.clone(),
                predicted_rainfall_mm: predicted,
                risk_level: RiskLevel::classify(predicted),
            }
        }));
    }

    if rows.is_empty() {
        PredictionOutcome::Empty
    } else {
        PredictionOutcome::Predictions(rows)
    }
}

/// Group prediction rows into one chart series per region, following the
/// order of `regions`. Regions with no rows get no series.
pub fn chart_series(rows: &[PredictionRow], regions: &[String]) -> Vec<ChartSeries> {
    regions
        .iter()
        .filter_map(|region| {
            let points: Vec<(u32, f64)> = rows
                .iter()
                .filter(|r| &r.region == region)
                .map(|r| (r.month, r.predicted_rainfall_mm))
                .collect();
            (!points.is_empty()).then(|| ChartSeries {
                region: region.clone(),
                points,
            })
        })
        .collect()
}
