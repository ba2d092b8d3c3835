use anyhow::{bail, Result};
use ripscan_core::config::AppConfig;
use std::path::PathBuf;

/// Picks the scan root: the command-line argument wins over `scan.root`.
pub fn scan_root(arg: Option<&str>, cfg: &AppConfig) -> Result<PathBuf> {
    match arg.or(cfg.scan.root.as_deref()) {
        Some(root) if !root.trim().is_empty() => Ok(PathBuf::from(root)),
        _ => bail!("no scan root given; pass ROOT or set scan.root in the config"),
    }
}
