//! Walks a movie directory tree, tracks the genre folder currently being
//! walked, and turns recognized rip files into [`MovieRip`] records.

use crate::config::{DuplicatePolicy, ScanConfig};
use crate::error::{DirectoryProblem, ScanError};
use crate::models::MovieRip;
use crate::parser;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What the scanner needs to know about a directory entry.
pub trait FileEntry {
    fn name(&self) -> Cow<'_, str>;
    fn path(&self) -> &Path;
    fn is_dir(&self) -> bool;
    fn size(&self) -> io::Result<u64>;

    fn parent(&self) -> Option<&Path> {
        self.path().parent()
    }
}

impl FileEntry for walkdir::DirEntry {
    fn name(&self) -> Cow<'_, str> {
        self.file_name().to_string_lossy()
    }

    fn path(&self) -> &Path {
        walkdir::DirEntry::path(self)
    }

    fn is_dir(&self) -> bool {
        self.file_type().is_dir()
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub rips: BTreeSet<MovieRip>,
    pub files_seen: usize,
    pub directories_seen: usize,
    /// Entries that could not be read during the walk.
    pub skipped: usize,
    /// Files whose rip collided with one already collected.
    pub duplicates: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RipScanner {
    genres: Vec<String>,
    extensions: BTreeSet<String>,
    exclude: GlobSet,
    include_hidden: bool,
    duplicates: DuplicatePolicy,
}

impl RipScanner {
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            genres: config.genres.clone(),
            extensions: config.normalized_extensions(),
            exclude: build_globset(&config.exclude)?,
            include_hidden: config.include_hidden,
            duplicates: config.duplicates,
        })
    }

    pub fn scan(&self, root: impl AsRef<Path>) -> Result<BTreeSet<MovieRip>, ScanError> {
        Ok(self.scan_with_report(root)?.rips)
    }

    pub fn scan_with_report(&self, root: impl AsRef<Path>) -> Result<ScanReport, ScanError> {
        let root = resolve_root(root.as_ref())?;
        info!("Scanning {} for movie rips...", root.display());

        let mut collector = RipCollector::new(self, &root);
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || self.should_descend(e.path()))
        {
            match entry {
                Ok(e) if e.depth() == 0 => continue,
                Ok(e) => collector.visit(&e),
                Err(err) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                    collector.skipped += 1;
                }
            }
        }

        let report = collector.finish();
        info!(
            "Scan complete. Found {} rips in {} files ({} duplicates, {} skipped).",
            report.rips.len(),
            report.files_seen,
            report.duplicates.len(),
            report.skipped
        );
        Ok(report)
    }

    fn is_genre(&self, name: &str) -> bool {
        self.genres.iter().any(|g| g == name)
    }

    fn is_rip(&self, file_name: &str) -> bool {
        self.extensions.contains(&parser::extension_of(file_name))
    }

    fn should_descend(&self, path: &Path) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        self.include_hidden || !is_hidden(path)
    }
}

/// Per-scan state. `current_genre` lives exactly as long as one scan.
struct RipCollector<'a> {
    scanner: &'a RipScanner,
    root: &'a Path,
    current_genre: Option<String>,
    rips: BTreeSet<MovieRip>,
    files_seen: usize,
    directories_seen: usize,
    skipped: usize,
    duplicates: Vec<PathBuf>,
}

impl<'a> RipCollector<'a> {
    fn new(scanner: &'a RipScanner, root: &'a Path) -> Self {
        Self {
            scanner,
            root,
            current_genre: None,
            rips: BTreeSet::new(),
            files_seen: 0,
            directories_seen: 0,
            skipped: 0,
            duplicates: Vec::new(),
        }
    }

    /// Entries must arrive in pre-order: a directory before anything inside it.
    fn visit<E: FileEntry + ?Sized>(&mut self, entry: &E) {
        let name = entry.name();
        if entry.is_dir() {
            self.directories_seen += 1;
            if self.scanner.is_genre(&name) {
                debug!("Entering genre {}", name);
                self.current_genre = Some(name.into_owned());
            }
            return;
        }

        self.files_seen += 1;
        if !self.scanner.is_rip(&name) {
            return;
        }
        let size = match entry.size() {
            Ok(size) => size,
            Err(err) => {
                warn!("Could not stat {}: {}", entry.path().display(), err);
                self.skipped += 1;
                return;
            }
        };

        let mut rip = parser::parse(&name);
        rip.file_size_bytes = size;
        if let Some(genre) = &self.current_genre {
            rip.genres.insert(genre.clone());
        }
        rip.parent_folder = parent_folder(entry.path(), self.root, self.current_genre.as_deref());
        self.insert(rip, entry.path());
    }

    fn insert(&mut self, rip: MovieRip, path: &Path) {
        match self.scanner.duplicates {
            DuplicatePolicy::Drop => {
                let label = rip.to_string();
                if !self.rips.insert(rip) {
                    warn!("Duplicate rip {} at {}, keeping the first one.", label, path.display());
                    self.duplicates.push(path.to_path_buf());
                }
            }
            DuplicatePolicy::MergeGenres => match self.rips.take(&rip) {
                Some(mut existing) => {
                    debug!("Duplicate rip {} at {}, merging genres.", existing, path.display());
                    existing.genres.extend(rip.genres);
                    self.rips.insert(existing);
                    self.duplicates.push(path.to_path_buf());
                }
                None => {
                    self.rips.insert(rip);
                }
            },
        }
    }

    fn finish(self) -> ScanReport {
        ScanReport {
            rips: self.rips,
            files_seen: self.files_seen,
            directories_seen: self.directories_seen,
            skipped: self.skipped,
            duplicates: self.duplicates,
        }
    }
}

/// Resolves the folder a rip is grouped under. Walks up from the file's
/// immediate parent towards `root`; the first directory whose own parent is
/// named like `genre` wins (`Action/Trilogy/Disc 1/x.mkv` gives `Trilogy`).
/// If the walk reaches `root` first, the immediate parent is used. A file
/// directly in `root`, or a resolved name equal to `genre`, yields `None`.
pub fn parent_folder(file: &Path, root: &Path, genre: Option<&str>) -> Option<String> {
    let immediate = file.parent()?;
    if immediate == root || !immediate.starts_with(root) {
        return None;
    }
    let is_genre = |dir: &Path| {
        genre.is_some_and(|g| dir_name(dir).is_some_and(|n| n.eq_ignore_ascii_case(g)))
    };
    if is_genre(immediate) {
        return None;
    }

    let mut resolved = immediate;
    let mut dir = immediate;
    while let Some(up) = dir.parent() {
        if up == root || !up.starts_with(root) {
            break;
        }
        if is_genre(up) {
            resolved = dir;
            break;
        }
        dir = up;
    }
    dir_name(resolved).filter(|name| !genre.is_some_and(|g| name.eq_ignore_ascii_case(g)))
}

fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let absolute = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    if !root.is_absolute() {
        debug!("Scan root {} is relative, using {}", root.display(), absolute.display());
    }
    let meta = fs::metadata(&absolute).map_err(|err| {
        let problem = match err.kind() {
            io::ErrorKind::NotFound => DirectoryProblem::DoesNotExist,
            _ => DirectoryProblem::NotReadable,
        };
        ScanError::invalid_directory(&absolute, problem)
    })?;
    let canonical = fs::canonicalize(&absolute).unwrap_or(absolute);
    if !meta.is_dir() {
        return Err(ScanError::invalid_directory(canonical, DirectoryProblem::NotADirectory));
    }
    if let Err(err) = fs::read_dir(&canonical) {
        debug!("Cannot list {}: {}", canonical.display(), err);
        return Err(ScanError::invalid_directory(canonical, DirectoryProblem::NotReadable));
    }
    Ok(canonical)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReleaseYear;

    struct FakeEntry {
        path: PathBuf,
        dir: bool,
        size: u64,
    }

    impl FakeEntry {
        fn dir(path: &str) -> Self {
            Self {
                path: PathBuf::from(path),
                dir: true,
                size: 0,
            }
        }

        fn file(path: &str, size: u64) -> Self {
            Self {
                path: PathBuf::from(path),
                dir: false,
                size,
            }
        }
    }

    impl FileEntry for FakeEntry {
        fn name(&self) -> Cow<'_, str> {
            self.path.file_name().unwrap().to_string_lossy()
        }

        fn path(&self) -> &Path {
            &self.path
        }

        fn is_dir(&self) -> bool {
            self.dir
        }

        fn size(&self) -> io::Result<u64> {
            Ok(self.size)
        }
    }

    fn scanner(policy: DuplicatePolicy) -> RipScanner {
        let mut cfg = ScanConfig::new(
            vec!["Action".into(), "Drama".into()],
            vec!["mkv".into(), "avi".into()],
        );
        cfg.duplicates = policy;
        RipScanner::new(&cfg).unwrap()
    }

    fn collect(scanner: &RipScanner, entries: &[FakeEntry]) -> ScanReport {
        let root = Path::new("/movies");
        let mut collector = RipCollector::new(scanner, root);
        for entry in entries {
            collector.visit(entry);
        }
        collector.finish()
    }

    #[test]
    fn genre_persists_into_later_siblings() {
        let scanner = scanner(DuplicatePolicy::Drop);
        let report = collect(
            &scanner,
            &[
                FakeEntry::file("/movies/Before (2000).mkv", 1),
                FakeEntry::dir("/movies/Action"),
                FakeEntry::file("/movies/Action/Heat (1995).mkv", 2),
                FakeEntry::dir("/movies/Misc"),
                FakeEntry::file("/movies/Misc/Later (2010).mkv", 3),
            ],
        );
        let rips: Vec<&MovieRip> = report.rips.iter().collect();
        assert_eq!(rips[0].title, "Before");
        assert!(rips[0].genres.is_empty());
        assert_eq!(rips[1].title, "Heat");
        assert!(rips[1].has_genre("Action"));
        assert_eq!(rips[1].file_size_bytes, 2);
        assert_eq!(rips[2].title, "Later");
        assert!(rips[2].has_genre("Action"));
        assert_eq!(rips[2].parent_folder.as_deref(), Some("Misc"));
        assert_eq!(report.directories_seen, 2);
        assert_eq!(report.files_seen, 3);
    }

    #[test]
    fn genre_match_is_case_sensitive() {
        let scanner = scanner(DuplicatePolicy::Drop);
        let report = collect(
            &scanner,
            &[
                FakeEntry::dir("/movies/action"),
                FakeEntry::file("/movies/action/Heat (1995).mkv", 1),
            ],
        );
        let rip = report.rips.iter().next().unwrap();
        assert!(rip.genres.is_empty());
        assert_eq!(rip.parent_folder.as_deref(), Some("action"));
    }

    #[test]
    fn ignores_unrecognized_extensions() {
        let scanner = scanner(DuplicatePolicy::Drop);
        let report = collect(
            &scanner,
            &[
                FakeEntry::dir("/movies/Drama"),
                FakeEntry::file("/movies/Drama/Heat (1995).srt", 1),
                FakeEntry::file("/movies/Drama/Heat (1995).AVI", 1),
            ],
        );
        assert_eq!(report.rips.len(), 1);
        assert_eq!(report.rips.iter().next().unwrap().file_extension, ".avi");
    }

    // A rip seen again under another genre is dropped along with that genre.
    #[test]
    fn duplicate_under_second_genre_is_dropped() {
        let scanner = scanner(DuplicatePolicy::Drop);
        let report = collect(
            &scanner,
            &[
                FakeEntry::dir("/movies/Action"),
                FakeEntry::file("/movies/Action/Heat (1995).mkv", 1),
                FakeEntry::dir("/movies/Drama"),
                FakeEntry::file("/movies/Drama/Heat (1995).mkv", 99),
            ],
        );
        assert_eq!(report.rips.len(), 1);
        let rip = report.rips.iter().next().unwrap();
        assert_eq!(rip.genres.iter().collect::<Vec<_>>(), vec!["Action"]);
        assert_eq!(rip.file_size_bytes, 1);
        assert_eq!(report.duplicates, vec![PathBuf::from("/movies/Drama/Heat (1995).mkv")]);
    }

    #[test]
    fn merge_policy_keeps_both_genres() {
        let scanner = scanner(DuplicatePolicy::MergeGenres);
        let report = collect(
            &scanner,
            &[
                FakeEntry::dir("/movies/Action"),
                FakeEntry::file("/movies/Action/Heat (1995).mkv", 1),
                FakeEntry::dir("/movies/Drama"),
                FakeEntry::file("/movies/Drama/Heat (1995).mkv", 99),
            ],
        );
        assert_eq!(report.rips.len(), 1);
        let rip = report.rips.iter().next().unwrap();
        assert!(rip.has_genre("Action") && rip.has_genre("Drama"));
        assert_eq!(rip.file_size_bytes, 1);
        assert_eq!(rip.release_year, ReleaseYear::new(1995));
        assert_eq!(report.duplicates.len(), 1);
    }

    #[test]
    fn parent_folder_resolution() {
        let root = Path::new("/movies");
        let genre = Some("Action");
        assert_eq!(parent_folder(Path::new("/movies/Heat.mkv"), root, genre), None);
        assert_eq!(parent_folder(Path::new("/movies/Action/Heat.mkv"), root, genre), None);
        assert_eq!(parent_folder(Path::new("/movies/ACTION/Heat.mkv"), root, genre), None);
        assert_eq!(
            parent_folder(Path::new("/movies/Action/Director's Cut/Heat.mkv"), root, genre),
            Some("Director's Cut".to_string())
        );
        assert_eq!(
            parent_folder(Path::new("/movies/Action/Trilogy/Disc 1/Heat.mkv"), root, genre),
            Some("Trilogy".to_string())
        );
        assert_eq!(
            parent_folder(Path::new("/movies/Misc/Deep/Heat.mkv"), root, genre),
            Some("Deep".to_string())
        );
        assert_eq!(
            parent_folder(Path::new("/movies/Misc/Heat.mkv"), root, None),
            Some("Misc".to_string())
        );
        assert_eq!(parent_folder(Path::new("/elsewhere/Heat.mkv"), root, genre), None);
    }
}
