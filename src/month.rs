//! Month vocabulary used by the station files and the month filter.
//!
//! Labels are Indonesian month names. Matching ignores case and
//! surrounding whitespace, so `"JANUARI"`, `"januari"` and `" Januari "`
//! all resolve to 1.

pub const MONTH_LABELS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Resolve a month label to its 1-12 ordinal.
pub fn ordinal(label: &str) -> Option<u32> {
    let wanted = label.trim();
    MONTH_LABELS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(wanted))
        .map(|idx| idx as u32 + 1)
}

/// Display label for a 1-12 ordinal.
pub fn label(ordinal: u32) -> Option<&'static str> {
    match ordinal {
        1..=12 => Some(MONTH_LABELS[ordinal as usize - 1]),
        _ => None,
    }
}

pub fn all_labels() -> Vec<String> {
    MONTH_LABELS.iter().map(|m| m.to_string()).collect()
}
