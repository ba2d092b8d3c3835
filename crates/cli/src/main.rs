use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ripscan::{output, paths, watch};
use ripscan_core::config;
use ripscan_core::config::AppConfig;
use ripscan_core::{parser, Catalog, MovieRip, RipScanner};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            root,
            genre,
            search,
            json,
        } => {
            let cfg = config::load(cli.config.as_deref())?;
            run_scan(&cfg, root.as_deref(), genre.as_deref(), search.as_deref(), json)
        }
        Commands::Genres { root, json } => {
            let cfg = config::load(cli.config.as_deref())?;
            run_genres(&cfg, root.as_deref(), json)
        }
        Commands::Parse { names, json } => run_parse(&names, json),
        Commands::Watch { root } => {
            let cfg = config::load(cli.config.as_deref())?;
            let scanner = RipScanner::new(&cfg.scan)?;
            let root = paths::scan_root(root.as_deref(), &cfg)?;
            watch::watch_root(&scanner, &root)
        }
    }
}

#[derive(Parser)]
#[command(name = "ripscan")]
#[command(about = "Catalog movie rips by genre folder and file name", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree and list the rips found
    Scan {
        /// Root directory; defaults to scan.root from the config
        root: Option<String>,
        /// Only list rips tagged with this genre
        #[arg(long)]
        genre: Option<String>,
        /// Only list rips whose title contains this text
        #[arg(long)]
        search: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Count rips per genre
    Genres {
        /// Root directory; defaults to scan.root from the config
        root: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse file names without touching the filesystem
    Parse {
        /// File names such as "Titanic (1997).mkv"
        #[arg(required = true)]
        names: Vec<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Rescan whenever the tree changes
    Watch {
        /// Root directory; defaults to scan.root from the config
        root: Option<String>,
    },
}

fn run_scan(
    cfg: &AppConfig,
    root: Option<&str>,
    genre: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let scanner = RipScanner::new(&cfg.scan)?;
    let root = paths::scan_root(root, cfg)?;
    let report = scanner
        .scan_with_report(&root)
        .with_context(|| format!("scan of {} failed", root.display()))?;

    let rips = Catalog::new(&report.rips).select(genre, search);

    if json {
        println!("{}", serde_json::to_string_pretty(&output::scan_json(&report, &rips))?);
    } else {
        for rip in &rips {
            println!("{}", output::rip_line(rip));
        }
        println!("{}", output::summary_line(&report));
    }
    Ok(())
}

fn run_genres(cfg: &AppConfig, root: Option<&str>, json: bool) -> Result<()> {
    let scanner = RipScanner::new(&cfg.scan)?;
    let root = paths::scan_root(root, cfg)?;
    let rips = scanner.scan(&root)?;
    let catalog = Catalog::new(&rips);
    let counts = catalog.genre_counts();
    let without_genre = catalog.without_genre();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::genres_json(&counts, without_genre))?
        );
    } else if catalog.is_empty() {
        println!("no rips found under {}", root.display());
    } else {
        for (genre, count) in &counts {
            println!("{genre}: {count}");
        }
        if without_genre > 0 {
            println!("(no genre): {without_genre}");
        }
        println!("total: {}", catalog.len());
    }
    Ok(())
}

fn run_parse(names: &[String], json: bool) -> Result<()> {
    let rips: Vec<MovieRip> = names.iter().map(|n| parser::parse(n)).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&rips)?);
    } else {
        for (name, rip) in names.iter().zip(&rips) {
            println!(
                "{name}: title={:?} year={} ext={:?}",
                rip.title, rip.release_year, rip.file_extension
            );
        }
    }
    Ok(())
}
