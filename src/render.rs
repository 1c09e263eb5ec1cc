//! Plain-text rendering of a [`DashboardView`].

use crate::dashboard::{DashboardView, Notice};
use crate::month;
use crate::model::{FloodRecord, PredictionRow, RiskLevel};
use std::io::{self, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Width of the longest bar in the chart section.
const CHART_WIDTH: usize = 40;

/// Console row for the prediction table; rainfall is pre-formatted to two decimals.
#[derive(Debug, Tabled)]
struct PredictionTableRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Rain (mm)")]
    rainfall: String,
    #[tabled(rename = "Risk")]
    risk: RiskLevel,
}

impl From<&PredictionRow> for PredictionTableRow {
    fn from(row: &PredictionRow) -> Self {
        Self {
            year: row.year,
            month: month_name(row.month),
            region: row.region.clone(),
            rainfall: format!("{:.2}", row.predicted_rainfall_mm),
            risk: row.risk_level,
        }
    }
}

#[derive(Debug, Tabled)]
struct FloodTableRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Incidents")]
    incidents: i64,
}

impl From<&FloodRecord> for FloodTableRow {
    fn from(flood: &FloodRecord) -> Self {
        Self {
            year: flood.year,
            region: flood.region.clone(),
            incidents: flood.incident_count,
        }
    }
}

fn markdown_table<T: Tabled>(rows: Vec<T>) -> Table {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table
}

pub fn render<W: Write>(out: &mut W, view: &DashboardView) -> io::Result<()> {
    render_selection(out, view)?;
    render_predictions(out, view)?;
    render_chart(out, view)?;
    render_floods(out, view)?;
    Ok(())
}

fn month_name(ordinal: u32) -> String {
    month::label(ordinal)
        .map(str::to_string)
        .unwrap_or_else(|| ordinal.to_string())
}

fn render_selection<W: Write>(out: &mut W, view: &DashboardView) -> io::Result<()> {
    let s = &view.selection;
    writeln!(out, "== Filter ==")?;
    writeln!(out, "Regions: {}", join_or_none(&s.regions))?;
    let years: Vec<String> = s.years.iter().map(i32::to_string).collect();
    writeln!(out, "Years:   {}", join_or_none(&years))?;
    writeln!(out, "Months:  {}", join_or_none(&s.months))?;
    writeln!(
        out,
        "Matching station rows: {}",
        view.filtered_stations.len()
    )?;
    writeln!(out)
}

fn render_predictions<W: Write>(out: &mut W, view: &DashboardView) -> io::Result<()> {
    writeln!(out, "== Rainfall prediction and flood risk ==")?;

    let rows = view.predictions.rows();
    if rows.is_empty() {
        for notice in &view.notices {
            if *notice == Notice::NoPredictions {
                writeln!(out, "{}", notice)?;
            }
        }
        return writeln!(out);
    }

    let table_rows: Vec<PredictionTableRow> = rows.iter().map(PredictionTableRow::from).collect();
    writeln!(out, "{}", markdown_table(table_rows))?;

    for summary in &view.risk_summary {
        writeln!(
            out,
            "{}: {} low, {} medium, {} high",
            summary.region, summary.low, summary.medium, summary.high
        )?;
    }
    writeln!(out)
}

fn render_chart<W: Write>(out: &mut W, view: &DashboardView) -> io::Result<()> {
    if view.chart.is_empty() {
        return Ok(());
    }

    writeln!(out, "== Predicted rainfall per region ==")?;
    let max = view
        .chart
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, v)| *v))
        .fold(0.0_f64, f64::max);

    for series in &view.chart {
        writeln!(out, "{}", series.region)?;
        for (m, value) in &series.points {
            writeln!(
                out,
                "  {:<10} {:>10.2} {}",
                month_name(*m),
                value,
                bar(*value, max)
            )?;
        }
    }
    writeln!(out)
}

fn render_floods<W: Write>(out: &mut W, view: &DashboardView) -> io::Result<()> {
    writeln!(out, "== Flood incidents per year ==")?;

    if view.floods.is_empty() {
        for notice in &view.notices {
            if *notice == Notice::NoFloodIncidents {
                writeln!(out, "{}", notice)?;
            }
        }
        return writeln!(out);
    }

    let table_rows: Vec<FloodTableRow> = view.floods.iter().map(FloodTableRow::from).collect();
    writeln!(out, "{}", markdown_table(table_rows))?;
    for (year, total) in view.incidents_by_year() {
        writeln!(out, "Total {}: {}", year, total)?;
    }
    writeln!(out)
}

/// Bar proportional to `value / max`; non-positive values draw nothing.
fn bar(value: f64, max: f64) -> String {
    if value <= 0.0 || max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * CHART_WIDTH as f64).round() as usize;
    "#".repeat(len.max(1))
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;
    use crate::model::StationRecord;
    use crate::selection::FilterSelection;

    fn render_to_string(view: &DashboardView) -> String {
        let mut buf = Vec::new();
        render(&mut buf, view).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_tables() {
        let stations = (1..=12)
            .map(|m| StationRecord {
                region: "Bandung".to_string(),
                year: 2015,
                month: m,
                rainfall_mm: 120.0,
            })
            .collect();
        let floods = vec![FloodRecord {
            year: 2020,
            region: "Bandung".to_string(),
            incident_count: 4,
        }];
        let dataset = Dataset::new(stations, floods);
        let selection = FilterSelection::new(["Bandung"], [2020], ["Februari"]);

        let text = render_to_string(&DashboardView::build(&dataset, &selection));
        assert!(text.contains("Februari"));
        assert!(text.contains("120.00"));
        assert!(text.contains("Medium"));
        assert!(text.contains("Bandung: 0 low, 1 medium, 0 high"));
        assert!(text.contains("Total 2020: 4"));
    }

    #[test]
    fn test_tables_have_headers_and_one_line_per_row() {
        let stations = vec![StationRecord {
            region: "Bogor".to_string(),
            year: 2015,
            month: 1,
            rainfall_mm: 250.0,
        }];
        let floods = vec![
            FloodRecord {
                year: 2015,
                region: "Bogor".to_string(),
                incident_count: 2,
            },
            FloodRecord {
                year: 2015,
                region: "Bandung".to_string(),
                incident_count: 7,
            },
        ];
        let dataset = Dataset::new(stations, floods);
        let selection = FilterSelection::new(["Bogor"], [2015], ["Januari", "Maret"]);

        let text = render_to_string(&DashboardView::build(&dataset, &selection));
        let header = text
            .lines()
            .find(|l| l.contains("Rain (mm)"))
            .expect("prediction header missing");
        for column in ["Year", "Month", "Region", "Risk"] {
            assert!(header.contains(column), "{column} not in {header}");
        }
        assert!(text.lines().any(|l| l.contains("Incidents")));

        // two prediction rows and one flood row for Bogor, one flood row for Bandung
        let cells = |region: &str| text.lines().filter(|l| l.contains(&format!("| {region}"))).count();
        assert_eq!(cells("Bogor"), 3);
        assert_eq!(cells("Bandung"), 1);
        assert!(text.contains("250.00"));
        assert!(text.contains("Total 2015: 9"));
    }

    #[test]
    fn test_render_notices_when_empty() {
        let dataset = Dataset::default();
        let selection = FilterSelection::new(["Bogor"], [2020], ["Januari"]);

        let text = render_to_string(&DashboardView::build(&dataset, &selection));
        assert!(text.contains("No prediction data"));
        assert!(text.contains("No flood incident data"));
        assert!(!text.contains("Predicted rainfall per region"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(100.0, 100.0).len(), CHART_WIDTH);
        assert_eq!(bar(50.0, 100.0).len(), CHART_WIDTH / 2);
        assert_eq!(bar(0.1, 100.0).len(), 1);
        assert!(bar(-5.0, 100.0).is_empty());
    }
}
