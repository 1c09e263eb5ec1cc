use crate::model::{FloodRecord, StationRecord};
use crate::selection::FilterSelection;
use std::collections::HashSet;

/// Station rows matching the selected regions, years and months, and flood
/// rows matching the selected years.
///
/// Flood rows are not narrowed by region; every region's incidents for the
/// chosen years are shown.
pub fn apply(
    stations: &[StationRecord],
    floods: &[FloodRecord],
    selection: &FilterSelection,
) -> (Vec<StationRecord>, Vec<FloodRecord>) {
    (
        filter_stations(stations, selection),
        filter_floods(floods, selection),
    )
}

pub fn filter_stations(
    stations: &[StationRecord],
    selection: &FilterSelection,
) -> Vec<StationRecord> {
    let regions: HashSet<&str> = selection.regions.iter().map(String::as_str).collect();
    let years: HashSet<i32> = selection.years.iter().copied().collect();
    let months: HashSet<u32> = selection.month_ordinals().into_iter().collect();

    stations
        .iter()
        .filter(|s| {
            regions.contains(s.region.as_str())
                && years.contains(&s.year)
                && months.contains(&s.month)
        })
        .cloned()
        .collect()
}

pub fn filter_floods(floods: &[FloodRecord], selection: &FilterSelection) -> Vec<FloodRecord> {
    let years: HashSet<i32> = selection.years.iter().copied().collect();
    floods
        .iter()
        .filter(|f| years.contains(&f.year))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(region: &str, year: i32, month: u32) -> StationRecord {
        StationRecord {
            region: region.to_string(),
            year,
            month,
            rainfall_mm: 100.0,
        }
    }

    fn flood(year: i32, region: &str) -> FloodRecord {
        FloodRecord {
            year,
            region: region.to_string(),
            incident_count: 3,
        }
    }

    fn sample_stations() -> Vec<StationRecord> {
        vec![
            station("Bandung", 2015, 1),
            station("Bandung", 2015, 2),
            station("Bandung", 2016, 1),
            station("Bogor", 2015, 1),
        ]
    }

    #[test]
    fn test_stations_match_all_three_dimensions() {
        let selection = FilterSelection::new(["Bandung"], [2015], ["Januari"]);
        let filtered = filter_stations(&sample_stations(), &selection);
        assert_eq!(filtered, vec![station("Bandung", 2015, 1)]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let selection = FilterSelection::new(["Bandung", "Bogor"], [2015], ["Januari", "Februari"]);
        let floods = vec![flood(2015, "Bandung"), flood(2016, "Bogor")];

        let (once_s, once_f) = apply(&sample_stations(), &floods, &selection);
        let (twice_s, twice_f) = apply(&once_s, &once_f, &selection);
        assert_eq!(once_s, twice_s);
        assert_eq!(once_f, twice_f);
        assert_eq!(once_s.len(), 3);
    }

    #[test]
    fn test_empty_dimension_yields_no_stations() {
        let stations = sample_stations();
        let no_regions = FilterSelection::new(Vec::<String>::new(), [2015], ["Januari"]);
        let no_years = FilterSelection::new(["Bandung"], Vec::<i32>::new(), ["Januari"]);
        let no_months = FilterSelection::new(["Bandung"], [2015], Vec::<String>::new());

        assert!(filter_stations(&stations, &no_regions).is_empty());
        assert!(filter_stations(&stations, &no_years).is_empty());
        assert!(filter_stations(&stations, &no_months).is_empty());
    }

    #[test]
    fn test_unknown_month_label_selects_nothing() {
        let selection = FilterSelection::new(["Bandung"], [2015], ["January"]);
        assert!(filter_stations(&sample_stations(), &selection).is_empty());
    }

    #[test]
    fn test_floods_filter_by_year_only() {
        let floods = vec![flood(2015, "Bandung"), flood(2020, "Bandung"), flood(2020, "Bogor")];
        let selection = FilterSelection::new(["Bandung"], [2020], ["Januari"]);
        let filtered = filter_floods(&floods, &selection);
        assert_eq!(filtered, vec![flood(2020, "Bandung"), flood(2020, "Bogor")]);
    }
}
