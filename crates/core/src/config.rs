use crate::error::ScanError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Default scan root when none is given on the command line.
    #[serde(default)]
    pub root: Option<String>,
    /// Exact (case-sensitive) names of genre directories.
    pub genres: Vec<String>,
    /// Recognized rip extensions, with or without the leading dot.
    pub extensions: Vec<String>,
    /// Glob patterns for entries to skip entirely.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Dot-prefixed entries are walked unless this is turned off.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// What happens when a rip with an already-seen `(title, year, extension)` turns up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first record, discard the later one including its genre.
    #[default]
    Drop,
    /// Keep the first record and add the later one's genres to it.
    MergeGenres,
}

fn default_include_hidden() -> bool {
    true
}

impl ScanConfig {
    pub fn new(genres: Vec<String>, extensions: Vec<String>) -> Self {
        Self {
            root: None,
            genres,
            extensions,
            exclude: Vec::new(),
            include_hidden: default_include_hidden(),
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.genres.iter().all(|g| g.trim().is_empty()) {
            return Err(ScanError::Config("no genres configured".to_string()));
        }
        if self.normalized_extensions().is_empty() {
            return Err(ScanError::Config("no rip extensions configured".to_string()));
        }
        Ok(())
    }

    /// Extensions lower-cased with a leading dot, e.g. `MKV` becomes `.mkv`.
    pub fn normalized_extensions(&self) -> BTreeSet<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{e}"))
            .collect()
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg: AppConfig = settings
        .build()?
        .try_deserialize()
        .context("failed to read scan configuration")?;
    cfg.scan.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn normalizes_extensions() {
        let cfg = ScanConfig::new(
            vec!["Drama".into()],
            vec!["MKV".into(), ".avi".into(), " .Mp4 ".into(), "".into()],
        );
        let exts: Vec<String> = cfg.normalized_extensions().into_iter().collect();
        assert_eq!(exts, vec![".avi", ".mkv", ".mp4"]);
    }

    #[test]
    fn rejects_empty_lists() {
        let no_genres = ScanConfig::new(vec![], vec!["mkv".into()]);
        assert!(matches!(no_genres.validate(), Err(ScanError::Config(_))));
        let no_exts = ScanConfig::new(vec!["Drama".into()], vec![".".into()]);
        assert!(matches!(no_exts.validate(), Err(ScanError::Config(_))));
    }

    #[test]
    fn loads_toml_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ripscan.toml");
        fs::write(
            &path,
            r#"
            [scan]
            root = "/srv/movies"
            genres = ["Action", "Drama"]
            extensions = ["mkv", ".avi"]
            duplicates = "merge_genres"
            "#,
        )
        .unwrap();
        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.scan.root.as_deref(), Some("/srv/movies"));
        assert_eq!(cfg.scan.genres, vec!["Action", "Drama"]);
        assert_eq!(cfg.scan.duplicates, DuplicatePolicy::MergeGenres);
        assert!(cfg.scan.include_hidden);
        assert!(cfg.scan.exclude.is_empty());
    }

    #[test]
    fn load_fails_without_extensions() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "[scan]\ngenres = [\"Action\"]\nextensions = []\n").unwrap();
        assert!(load(Some(path.to_str().unwrap())).is_err());
    }
}
