use rainfall_risk::config::{Config, DataConfig, StationColumns, StationSource};
use rainfall_risk::error::AppError;
use rainfall_risk::loader::{CachedLoader, Loader};
use rainfall_risk::selection::FilterSelection;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const CITARUM: &str = "\
tahun,bulan,jumlah_curah_hujan
2015,JANUARI,210.4
2015,FEBRUARI,180.0
2015,MARET,
2015,SMARCH,90.0
2016,JANUARI,230.1
";

const CISADEA: &str = "\
tahun,bulan,jumlah_curah_hujan
2015,januari,95.5
2016,Januari,101.0
";

const BANJIR: &str = "\
tahun,wilayah,jumlah_kejadian
2015,Bandung,3
2020,Bogor,5
";

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path.to_string_lossy().into_owned()
}

fn data_config(dir: &Path) -> DataConfig {
    DataConfig {
        stations: vec![
            StationSource {
                path: write(dir, "curah_hujan_stasiun_citarum.csv", CITARUM),
                region: "Bandung".to_string(),
            },
            StationSource {
                path: write(dir, "curah_hujan_stasiun_cisadea_cibareno.csv", CISADEA),
                region: "Bogor".to_string(),
            },
        ],
        floods: write(dir, "banjir.csv", BANJIR),
        columns: StationColumns::default(),
    }
}

/// Every configured source is loaded and tagged with its own region
#[test]
fn test_load_tags_each_source_with_its_region() {
    let dir = TempDir::new().unwrap();
    let dataset = Loader::load(&data_config(dir.path())).expect("Load failed");

    assert_eq!(dataset.regions(), vec!["Bandung", "Bogor"]);
    assert_eq!(dataset.stations.len(), 5);
    assert_eq!(
        dataset.stations.iter().filter(|s| s.region == "Bogor").count(),
        2
    );
    assert_eq!(dataset.floods.len(), 2);

    for station in &dataset.stations {
        assert!((1..=12).contains(&station.month));
        assert!(station.rainfall_mm.is_finite());
    }
}

/// A missing source file is fatal for the load
#[test]
fn test_missing_station_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut config = data_config(dir.path());
    config.stations[0].path = dir.path().join("nope.csv").to_string_lossy().into_owned();

    match Loader::load(&config) {
        Err(AppError::Io(e)) => assert!(e.to_string().contains("nope.csv")),
        other => panic!("Expected Io error, got: {:?}", other.map(|d| d.stations.len())),
    }
}

#[test]
fn test_missing_flood_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut config = data_config(dir.path());
    config.floods = dir.path().join("banjir_hilang.csv").to_string_lossy().into_owned();

    assert!(matches!(Loader::load(&config), Err(AppError::Io(_))));
}

/// Glob sources pick up every matching file under one region
#[test]
fn test_glob_source_loads_all_matches() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bandung_a.csv", CITARUM);
    write(dir.path(), "bandung_b.csv", CISADEA);
    let config = DataConfig {
        stations: vec![StationSource {
            path: format!("{}/bandung_*.csv", dir.path().display()),
            region: "Bandung".to_string(),
        }],
        floods: write(dir.path(), "banjir.csv", BANJIR),
        columns: StationColumns::default(),
    };

    let dataset = Loader::load(&config).expect("Load failed");
    assert_eq!(dataset.stations.len(), 5);
    assert_eq!(dataset.regions(), vec!["Bandung"]);
}

/// Cached loads are reused until a source file changes
#[test]
fn test_cached_loader_reloads_on_change() {
    let dir = TempDir::new().unwrap();
    let config = data_config(dir.path());
    let mut loader = CachedLoader::new(config.clone());

    let first = loader.get().expect("Load failed");
    let second = loader.get().expect("Load failed");
    assert!(Arc::ptr_eq(&first, &second));

    fs::write(&config.floods, format!("{}2021,Bandung,9\n", BANJIR)).unwrap();
    let third = loader.get().expect("Reload failed");
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.floods.len(), 3);
}

/// Config file on disk through to the initial selection
#[test]
fn test_config_file_drives_default_selection() {
    let dir = TempDir::new().unwrap();
    let data = data_config(dir.path());
    let yaml = format!(
        "data:\n  stations:\n    - path: {}\n      region: Bandung\n    - path: {}\n      region: Bogor\n  floods: {}\ndefaults:\n  years: [2016]\n  months: [Januari]\n",
        data.stations[0].path, data.stations[1].path, data.floods
    );
    let config_path = write(dir.path(), "config.yaml", &yaml);

    let config = Config::load(&config_path).expect("Config load failed");
    let dataset = Loader::load(&config.data).expect("Load failed");
    let selection = FilterSelection::from_defaults(&config.defaults, &dataset.regions());

    assert_eq!(selection.regions, vec!["Bandung", "Bogor"]);
    assert_eq!(selection.years, vec![2016]);
    assert_eq!(selection.month_ordinals(), vec![1]);
}

#[test]
fn test_missing_config_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(AppError::Config(_))));
}
