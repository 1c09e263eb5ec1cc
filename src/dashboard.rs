use crate::filter;
use crate::loader::Dataset;
use crate::model::{FloodRecord, RiskLevel, StationRecord};
use crate::pipeline::{self, ChartSeries, PredictionOutcome};
use crate::selection::FilterSelection;
use std::fmt;
use tracing::debug;

/// Informational states shown instead of an empty table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoPredictions,
    NoFloodIncidents,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoPredictions => {
                f.write_str("No prediction data for the selected region/year/month.")
            }
            Notice::NoFloodIncidents => {
                f.write_str("No flood incident data for the current filter.")
            }
        }
    }
}

/// Count of prediction rows per risk level for one region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RiskSummary {
    pub region: String,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub filtered_stations: Vec<StationRecord>,
    pub predictions: PredictionOutcome,
    pub chart: Vec<ChartSeries>,
    pub risk_summary: Vec<RiskSummary>,
    pub floods: Vec<FloodRecord>,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    /// Run the filter and prediction stages for one interaction.
    pub fn build(dataset: &Dataset, selection: &FilterSelection) -> Self {
        let (filtered_stations, floods) =
            filter::apply(&dataset.stations, &dataset.floods, selection);

        let predictions = pipeline::predict(&dataset.stations, selection);
        let chart = pipeline::chart_series(predictions.rows(), &selection.regions);
        let risk_summary = summarize_risk(&predictions, &selection.regions);

        let mut notices = Vec::new();
        if predictions.is_empty() {
            notices.push(Notice::NoPredictions);
        }
        if floods.is_empty() {
            notices.push(Notice::NoFloodIncidents);
        }

        debug!(
            "Rendered view: {} station rows, {} predictions, {} flood rows",
            filtered_stations.len(),
            predictions.rows().len(),
            floods.len()
        );

        Self {
            selection: selection.clone(),
            filtered_stations,
            predictions,
            chart,
            risk_summary,
            floods,
            notices,
        }
    }

    /// Total incidents per year over the filtered flood rows, ascending by year.
    pub fn incidents_by_year(&self) -> Vec<(i32, i64)> {
        let mut totals: std::collections::BTreeMap<i32, i64> = std::collections::BTreeMap::new();
        for flood in &self.floods {
            *totals.entry(flood.year).or_insert(0) += flood.incident_count;
        }
        totals.into_iter().collect()
    }
}

fn summarize_risk(predictions: &PredictionOutcome, regions: &[String]) -> Vec<RiskSummary> {
    regions
        .iter()
        .filter_map(|region| {
            let mut summary = RiskSummary {
                region: region.clone(),
                ..Default::default()
            };
            let mut any = false;
            for row in predictions.rows().iter().filter(|r| &r.region == region) {
                any = true;
                match row.risk_level {
                    RiskLevel::Low => summary.low += 1,
                    RiskLevel::Medium => summary.medium += 1,
                    RiskLevel::High => summary.high += 1,
                }
            }
            any.then_some(summary)
        })
        .collect()
}
