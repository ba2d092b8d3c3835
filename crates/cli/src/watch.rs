use crate::output;
use anyhow::Result;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ripscan_core::{MovieRip, RipScanner};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, warn};

// Quiet period before a burst of events triggers one rescan.
const SETTLE: Duration = Duration::from_millis(500);

/// Scans `root`, then rescans whenever something below it changes and
/// prints which rips appeared or disappeared.
pub fn watch_root(scanner: &RipScanner, root: &Path) -> Result<()> {
    let report = scanner.scan_with_report(root)?;
    println!("{}", output::summary_line(&report));
    let mut known = report.rips;

    let (tx, rx) = channel::<notify::Result<notify::Event>>();
    let mut watcher: RecommendedWatcher = Watcher::new(
        tx,
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;
    watcher.watch(root, RecursiveMode::Recursive)?;

    println!("Watching {}...", root.display());
    loop {
        match rx.recv() {
            Ok(Ok(event)) => {
                if !is_relevant(&event) {
                    continue;
                }
                debug!("Change detected: {:?}", event.paths);
                drain_until_quiet(&rx);
                match scanner.scan_with_report(root) {
                    Ok(report) => {
                        let (added, removed) = diff(&known, &report.rips);
                        for rip in removed {
                            println!("- {}", output::rip_line(rip));
                        }
                        for rip in added {
                            println!("+ {}", output::rip_line(rip));
                        }
                        println!("{}", output::summary_line(&report));
                        known = report.rips;
                    }
                    Err(e) => warn!("rescan of {} failed: {}", root.display(), e),
                }
            }
            Ok(Err(e)) => warn!("watch error: {:?}", e),
            Err(_) => return Ok(()),
        }
    }
}

fn drain_until_quiet<T>(rx: &Receiver<T>) {
    loop {
        match rx.recv_timeout(SETTLE) {
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Access events never change what a scan would find.
pub fn is_relevant(event: &notify::Event) -> bool {
    !matches!(event.kind, EventKind::Access(_))
}

/// Rips only in `after` (added) and only in `before` (removed).
pub fn diff<'a>(
    before: &'a BTreeSet<MovieRip>,
    after: &'a BTreeSet<MovieRip>,
) -> (Vec<&'a MovieRip>, Vec<&'a MovieRip>) {
    let added = after.difference(before).collect();
    let removed = before.difference(after).collect();
    (added, removed)
}
