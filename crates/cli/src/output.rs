use ripscan_core::{MovieRip, ScanReport};
use serde_json::json;
use std::collections::BTreeMap;

/// One human-readable line per rip, e.g. `Heat (1995).mkv  [Action]  /Director's Cut  1.4 GiB`.
pub fn rip_line(rip: &MovieRip) -> String {
    let mut line = rip.to_string();
    if !rip.genres.is_empty() {
        let genres: Vec<&str> = rip.genres.iter().map(String::as_str).collect();
        line.push_str(&format!("  [{}]", genres.join(", ")));
    }
    if let Some(folder) = &rip.parent_folder {
        line.push_str(&format!("  /{folder}"));
    }
    line.push_str(&format!("  {}", human_size(rip.file_size_bytes)));
    line
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

pub fn summary_line(report: &ScanReport) -> String {
    format!(
        "scan: {} rips, {} files, {} directories, {} duplicates, {} skipped",
        report.rips.len(),
        report.files_seen,
        report.directories_seen,
        report.duplicates.len(),
        report.skipped
    )
}

pub fn scan_json(report: &ScanReport, rips: &[&MovieRip]) -> serde_json::Value {
    json!({
        "status": "ok",
        "discovered": report.rips.len(),
        "files_seen": report.files_seen,
        "directories_seen": report.directories_seen,
        "skipped": report.skipped,
        "duplicates": report
            .duplicates
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        "rips": rips,
    })
}

pub fn genres_json(counts: &BTreeMap<String, usize>, without_genre: usize) -> serde_json::Value {
    json!({
        "status": "ok",
        "genres": counts,
        "without_genre": without_genre,
    })
}
