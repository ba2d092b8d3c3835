use crate::models::MovieRip;
use std::collections::{BTreeMap, BTreeSet};

/// Read-only view over the rips produced by one scan.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    rips: &'a BTreeSet<MovieRip>,
}

impl<'a> Catalog<'a> {
    pub fn new(rips: &'a BTreeSet<MovieRip>) -> Self {
        Self { rips }
    }

    pub fn len(&self) -> usize {
        self.rips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rips.is_empty()
    }

    /// Rips tagged with `genre` (case-insensitive) whose title contains
    /// `title` (ignoring case). `None` leaves that side unfiltered.
    pub fn select(&self, genre: Option<&str>, title: Option<&str>) -> Vec<&'a MovieRip> {
        let needle = title.map(str::to_lowercase);
        self.rips
            .iter()
            .filter(|r| genre.map_or(true, |g| r.has_genre(g)))
            .filter(|r| {
                needle
                    .as_deref()
                    .map_or(true, |n| r.title.to_lowercase().contains(n))
            })
            .collect()
    }

    pub fn genre_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for genre in self.rips.iter().flat_map(|r| r.genres.iter()) {
            *counts.entry(genre.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn without_genre(&self) -> usize {
        self.rips.iter().filter(|r| r.genres.is_empty()).count()
    }
}
