use crate::config::{DataConfig, StationColumns, StationSource};
use crate::error::{AppError, Result};
use crate::model::{FloodRecord, StationRecord};
use crate::month;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Row-level outcome of reading one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total_rows: usize,
    pub kept: usize,
    pub unknown_month: usize,
    pub missing_rainfall: usize,
    pub missing_year: usize,
    pub malformed: usize,
}

impl LoadStats {
    pub fn dropped(&self) -> usize {
        self.total_rows - self.kept
    }

    fn merge(&mut self, other: &LoadStats) {
        self.total_rows += other.total_rows;
        self.kept += other.kept;
        self.unknown_month += other.unknown_month;
        self.missing_rainfall += other.missing_rainfall;
        self.missing_year += other.missing_year;
        self.malformed += other.malformed;
    }
}

/// Loaded station and flood tables. Immutable once built; every filter and
/// prediction pass borrows from it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub stations: Vec<StationRecord>,
    pub floods: Vec<FloodRecord>,
}

impl Dataset {
    pub fn new(stations: Vec<StationRecord>, floods: Vec<FloodRecord>) -> Self {
        Self { stations, floods }
    }

    /// Regions with at least one station row, in first-seen order.
    pub fn regions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut regions = Vec::new();
        for station in &self.stations {
            if seen.insert(station.region.as_str()) {
                regions.push(station.region.clone());
            }
        }
        regions
    }
}

#[derive(Debug, Deserialize)]
struct FloodRow {
    tahun: i32,
    wilayah: String,
    jumlah_kejadian: i64,
}

const FLOOD_COLUMNS: [&str; 3] = ["tahun", "wilayah", "jumlah_kejadian"];

pub struct Loader;

impl Loader {
    /// Read every configured station source and the flood file.
    ///
    /// Any unreadable source fails the whole load.
    pub fn load(config: &DataConfig) -> Result<Dataset> {
        let mut stations = Vec::new();
        let mut totals = LoadStats::default();

        for source in &config.stations {
            for path in resolve_station_paths(source)? {
                let file = open(&path)?;
                let (records, stats) =
                    Self::parse_stations(file, &source.region, &config.columns)?;
                info!(
                    "Loaded {} station rows for {} from {} ({} dropped: {} unknown month, {} missing rainfall, {} missing year, {} malformed)",
                    stats.kept,
                    source.region,
                    path.display(),
                    stats.dropped(),
                    stats.unknown_month,
                    stats.missing_rainfall,
                    stats.missing_year,
                    stats.malformed
                );
                totals.merge(&stats);
                stations.extend(records);
            }
        }

        // Floods are a single file, never a glob
        let flood_path = PathBuf::from(&config.floods);
        let (floods, flood_stats) = Self::parse_floods(open(&flood_path)?)?;
        info!(
            "Loaded {} flood incident rows from {} ({} malformed)",
            flood_stats.kept,
            flood_path.display(),
            flood_stats.malformed
        );

        debug!(
            "Station totals: {}/{} rows kept",
            totals.kept, totals.total_rows
        );

        Ok(Dataset::new(stations, floods))
    }

    /// Parse one station CSV, tagging every kept row with `region`.
    ///
    /// Rows whose month label is outside the vocabulary, or whose rainfall
    /// or year is missing, are dropped and counted.
    pub fn parse_stations<R: Read>(
        reader: R,
        region: &str,
        columns: &StationColumns,
    ) -> Result<(Vec<StationRecord>, LoadStats)> {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let month_idx = column_index(&headers, &columns.month)?;
        let year_idx = column_index(&headers, &columns.year)?;
        let rainfall_idx = column_index(&headers, &columns.rainfall)?;

        let mut records = Vec::new();
        let mut stats = LoadStats::default();

        for (row_num, result) in rdr.records().enumerate() {
            stats.total_rows += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    stats.malformed += 1;
                    warn!("Skipping malformed station row {}: {}", row_num + 1, e);
                    continue;
                }
            };

            let Some(month) = field(&row, month_idx).and_then(month::ordinal) else {
                stats.unknown_month += 1;
                warn!(
                    "Dropping station row {}: month label {:?} not recognized",
                    row_num + 1,
                    field(&row, month_idx)
                );
                continue;
            };

            let Some(rainfall_mm) = field(&row, rainfall_idx).and_then(parse_optional_float)
            else {
                stats.missing_rainfall += 1;
                warn!("Dropping station row {}: rainfall missing", row_num + 1);
                continue;
            };

            let Some(year) = field(&row, year_idx).and_then(parse_optional_year) else {
                stats.missing_year += 1;
                warn!("Dropping station row {}: year missing", row_num + 1);
                continue;
            };

            records.push(StationRecord {
                region: region.to_string(),
                year,
                month,
                rainfall_mm,
            });
            stats.kept += 1;
        }

        Ok((records, stats))
    }

    /// Parse the flood incident CSV (`tahun,wilayah,jumlah_kejadian`).
    pub fn parse_floods<R: Read>(reader: R) -> Result<(Vec<FloodRecord>, LoadStats)> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        for name in FLOOD_COLUMNS {
            column_index(&headers, name)?;
        }
        // serde matches field names exactly, so fold header case first
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        rdr.set_headers(StringRecord::from(lowered));

        let mut records = Vec::new();
        let mut stats = LoadStats::default();

        for (row_num, result) in rdr.deserialize::<FloodRow>().enumerate() {
            stats.total_rows += 1;
            match result {
                Ok(row) => {
                    records.push(FloodRecord {
                        year: row.tahun,
                        region: row.wilayah,
                        incident_count: row.jumlah_kejadian,
                    });
                    stats.kept += 1;
                }
                Err(e) => {
                    stats.malformed += 1;
                    warn!("Skipping malformed flood row {}: {}", row_num + 1, e);
                }
            }
        }

        Ok((records, stats))
    }
}

/// Expand a station source into concrete file paths.
///
/// Plain paths are returned as-is so a missing file surfaces as an IO error
/// when opened. Glob patterns must match at least one file.
pub fn resolve_station_paths(source: &StationSource) -> Result<Vec<PathBuf>> {
    if !source.path.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(&source.path)]);
    }

    let entries = glob::glob(&source.path).map_err(|e| {
        AppError::Config(format!(
            "Invalid station path pattern '{}': {}",
            source.path, e
        ))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => return Err(AppError::Io(e.into())),
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No station files match '{}'", source.path),
        )));
    }

    Ok(paths)
}

/// Memoizes the loaded [`Dataset`] by source identity.
///
/// The identity is each resolved source path with its length and
/// modification time; the data is re-read only when that changes.
pub struct CachedLoader {
    config: DataConfig,
    cached: Option<(SourceIdentity, Arc<Dataset>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceIdentity(Vec<(PathBuf, u64, Option<SystemTime>)>);

impl SourceIdentity {
    fn capture(config: &DataConfig) -> Result<Self> {
        let mut paths = Vec::new();
        for source in &config.stations {
            paths.extend(resolve_station_paths(source)?);
        }
        paths.push(PathBuf::from(&config.floods));

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let meta = std::fs::metadata(&path).map_err(|e| with_path(&path, e))?;
            // mtime may be unsupported; length still catches most edits
            entries.push((path, meta.len(), meta.modified().ok()));
        }
        Ok(Self(entries))
    }
}

impl CachedLoader {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            cached: None,
        }
    }

    pub fn get(&mut self) -> Result<Arc<Dataset>> {
        let identity = SourceIdentity::capture(&self.config)?;

        if let Some((cached_identity, dataset)) = &self.cached {
            if *cached_identity == identity {
                debug!("Source files unchanged, reusing loaded dataset");
                return Ok(Arc::clone(dataset));
            }
            info!("Source files changed, reloading dataset");
        }

        let dataset = Arc::new(Loader::load(&self.config)?);
        self.cached = Some((identity, Arc::clone(&dataset)));
        Ok(dataset)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| with_path(path, e))
}

fn with_path(path: &Path, e: std::io::Error) -> AppError {
    AppError::Io(std::io::Error::new(
        e.kind(),
        format!("{}: {}", path.display(), e),
    ))
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            AppError::Parse(format!(
                "Missing column '{}' (found: {})",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
}

fn field(row: &StringRecord, idx: usize) -> Option<&str> {
    row.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_optional_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Years may arrive as `2015` or, from spreadsheet exports, `2015.0`.
fn parse_optional_year(s: &str) -> Option<i32> {
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    let val = s.parse::<f64>().ok()?;
    let in_range = val >= f64::from(i32::MIN) && val <= f64::from(i32::MAX);
    if val.is_finite() && val.fract() == 0.0 && in_range {
        Some(val as i32)
    } else {
        None
    }
}
