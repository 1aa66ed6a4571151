use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use culla::color::{hex, kde_triplet};
use culla::config::PlasmaPaths;
use culla::plasma::{self, Kde, SystemRunner};
use culla::{ThemePalette, extract_theme_file};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Generate a Plasma theme from the colours of the current wallpaper.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Use this image instead of the current Plasma wallpaper
    #[arg(short, long, value_name = "FILE")]
    wallpaper: Option<PathBuf>,

    /// Path to TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of colours to cluster the wallpaper into
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Seed for the k-means initialisation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the palette without touching the desktop
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print the palette as JSON (implies --dry-run)
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
///
/// `RUST_LOG` wins unless `-v` is given, which raises the crate's level.
fn init_tracing(verbosity: u8) -> Result<()> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("culla=info"));
    if verbosity > 0 {
        let level = if verbosity == 1 {
            Level::DEBUG
        } else {
            Level::TRACE
        };
        filter = filter.add_directive(
            format!("culla={level}")
                .parse()
                .context("building log filter")?,
        );
    }
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn palette_json(palette: &ThemePalette) -> Result<String> {
    serde_json::to_string_pretty(palette).context("serialising palette")
}

fn print_palette(palette: &ThemePalette, json: bool) -> Result<()> {
    if json {
        println!("{}", palette_json(palette)?);
        return Ok(());
    }
    for (name, color) in palette.entries() {
        println!("{name:<18} {:<12} {}", kde_triplet(color), hex(color));
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let mut cfg = culla::config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(k) = args.clusters {
        cfg.clusters = k;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    let paths = PlasmaPaths::resolve(&cfg.paths);

    let wallpaper = match args.wallpaper {
        Some(path) => path,
        None => plasma::locate_wallpaper(&paths).context("locating wallpaper")?,
    };
    info!(wallpaper = %wallpaper.display(), "sampling wallpaper");

    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let theme = extract_theme_file(&wallpaper, &cfg.extract_options(), &mut rng)
        .with_context(|| format!("extracting colours from {}", wallpaper.display()))?;

    if args.dry_run || args.json {
        return print_palette(&theme.palette, args.json);
    }

    plasma::write_colors(&theme.palette, &paths.desktop_theme_dir, &cfg.theme_name)
        .context("unable to write Plasma colours; is the theme installed?")?;
    Kde::new(SystemRunner, &cfg.tools, &cfg.theme_name)
        .apply(&theme.palette, &paths.aurorae_theme_dir)
        .context("applying theme")?;

    println!("Applied {} from {}", cfg.theme_name, wallpaper.display());
    Ok(())
}
