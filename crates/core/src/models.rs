use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Release year of a rip. Year 0 stands for "unknown" and never maps to a date.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReleaseYear(u16);

impl ReleaseYear {
    pub const UNKNOWN: ReleaseYear = ReleaseYear(0);

    pub fn new(year: u16) -> Self {
        ReleaseYear(year)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn is_known(self) -> bool {
        self.0 != 0
    }

    /// January 1st of the release year, `None` when the year is unknown.
    pub fn release_date(self) -> Option<NaiveDate> {
        if !self.is_known() {
            return None;
        }
        NaiveDate::from_ymd_opt(i32::from(self.0), 1, 1)
    }
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("unknown")
        }
    }
}

/// One movie rip found on disk.
///
/// Equality and ordering only look at `(title, release_year, file_extension)`,
/// so two rips of the same movie in the same container are the same entry in
/// an ordered set even when size, genres or folder differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRip {
    pub title: String,
    pub release_year: ReleaseYear,
    pub file_extension: String,
    #[serde(default)]
    pub file_size_bytes: u64,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub genres: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder: Option<String>,
}

impl MovieRip {
    pub fn new(
        title: impl Into<String>,
        release_year: ReleaseYear,
        file_extension: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            release_year,
            file_extension: file_extension.into(),
            file_size_bytes: 0,
            genres: BTreeSet::new(),
            parent_folder: None,
        }
    }

    pub fn key(&self) -> (&str, ReleaseYear, &str) {
        (&self.title, self.release_year, &self.file_extension)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

impl PartialEq for MovieRip {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for MovieRip {}

impl PartialOrd for MovieRip {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MovieRip {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for MovieRip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        if self.release_year.is_known() {
            write!(f, " ({})", self.release_year)?;
        }
        f.write_str(&self.file_extension)
    }
}
