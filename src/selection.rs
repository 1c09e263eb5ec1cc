//! Filter selection state and the line commands that change it.

use crate::config::{
    SelectionDefaults, MAX_YEAR, MIN_YEAR, YEAR_OPTIONS_END, YEAR_OPTIONS_START,
};
use crate::error::{AppError, Result};
use crate::month;
use std::collections::HashSet;

/// Regions, years and month labels picked by the user.
///
/// Each list is de-duplicated but keeps the order it was given in; that
/// order is the order prediction rows come out in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub regions: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<String>,
}

impl FilterSelection {
    pub fn new<R, M>(regions: R, years: impl IntoIterator<Item = i32>, months: M) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            regions: dedup(regions.into_iter().map(Into::into)),
            years: dedup(years),
            months: dedup(months.into_iter().map(Into::into)),
        }
    }

    /// Initial selection from config. Empty region or month lists select
    /// everything available.
    pub fn from_defaults(defaults: &SelectionDefaults, available_regions: &[String]) -> Self {
        let regions = if defaults.regions.is_empty() {
            available_regions.to_vec()
        } else {
            defaults.regions.clone()
        };
        let months = if defaults.months.is_empty() {
            month::all_labels()
        } else {
            defaults.months.clone()
        };
        Self::new(regions, defaults.years.get_years(), months)
    }

    /// Month ordinals of the selected labels, in selection order. Labels
    /// outside the vocabulary select nothing.
    pub fn month_ordinals(&self) -> Vec<u32> {
        self.months.iter().filter_map(|m| month::ordinal(m)).collect()
    }

    /// Apply a selection-changing command. Returns `false` for commands
    /// that do not touch the selection.
    pub fn apply(
        &mut self,
        command: &Command,
        defaults: &FilterSelection,
        available_regions: &[String],
    ) -> bool {
        match command {
            Command::Regions(regions) => self.regions = dedup(regions.iter().cloned()),
            Command::Years(years) => self.years = dedup(years.iter().copied()),
            Command::Months(months) => self.months = dedup(months.iter().cloned()),
            Command::All(Dimension::Region) => self.regions = available_regions.to_vec(),
            Command::All(Dimension::Year) => {
                self.years = (YEAR_OPTIONS_START..=YEAR_OPTIONS_END).collect()
            }
            Command::All(Dimension::Month) => self.months = month::all_labels(),
            Command::Reset => *self = defaults.clone(),
            Command::Show | Command::Help | Command::Quit => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    Year,
    Month,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Regions(Vec<String>),
    Years(Vec<i32>),
    Months(Vec<String>),
    All(Dimension),
    Reset,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  region <name,..>          select regions (e.g. region Bandung,Bogor)
  year <y,..|from-to>       select years (e.g. year 2017 or year 2015-2020)
  month <label,..>          select months (e.g. month Januari,Februari)
  all <region|year|month>   select every option for one filter
  reset                     restore the initial selection
  show                      render the dashboard again
  help                      show this message
  quit                      exit";

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword.to_ascii_lowercase().as_str() {
            "region" | "regions" | "wilayah" => Ok(Command::Regions(split_list(rest))),
            "year" | "years" | "tahun" => Ok(Command::Years(parse_years(rest)?)),
            "month" | "months" | "bulan" => Ok(Command::Months(parse_months(rest)?)),
            "all" => match rest.to_ascii_lowercase().as_str() {
                "region" | "regions" => Ok(Command::All(Dimension::Region)),
                "year" | "years" => Ok(Command::All(Dimension::Year)),
                "month" | "months" => Ok(Command::All(Dimension::Month)),
                other => Err(AppError::InvalidData(format!(
                    "Unknown filter '{}', expected region, year or month",
                    other
                ))),
            },
            "reset" => Ok(Command::Reset),
            "show" | "" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(AppError::InvalidData(format!(
                "Unknown command '{}' (type 'help' for a list)",
                other
            ))),
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_years(s: &str) -> Result<Vec<i32>> {
    let mut years = Vec::new();
    for item in split_list(s) {
        if let Some((from, to)) = item.split_once('-') {
            let from = parse_year(from)?;
            let to = parse_year(to)?;
            if from > to {
                return Err(AppError::InvalidData(format!(
                    "Year range '{}' is reversed",
                    item
                )));
            }
            years.extend(from..=to);
        } else {
            years.push(parse_year(&item)?);
        }
    }
    Ok(years)
}

fn parse_year(s: &str) -> Result<i32> {
    let s = s.trim();
    let year = s
        .parse::<i32>()
        .map_err(|e| AppError::InvalidData(format!("Invalid year '{}': {}", s, e)))?;
    // also caps how many years a range can expand to
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::InvalidData(format!(
            "Year {} out of valid range ({}-{})",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(year)
}

fn parse_months(s: &str) -> Result<Vec<String>> {
    let mut months = Vec::new();
    for item in split_list(s) {
        let ordinal = month::ordinal(&item).ok_or_else(|| {
            AppError::InvalidData(format!(
                "Unknown month '{}' (expected one of: {})",
                item,
                month::MONTH_LABELS.join(", ")
            ))
        })?;
        // Normalize to the display label so "JANUARI" and "Januari" dedup together.
        if let Some(label) = month::label(ordinal) {
            months.push(label.to_string());
        }
    }
    Ok(months)
}

fn dedup<T: Eq + std::hash::Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
