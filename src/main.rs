use std::path::PathBuf;

use anyhow::Context;
use m3u_curator_lib::{CurationConfig, CurationEngine, PlaylistError, PlaylistParser};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Playlist to read
    #[arg(short, long, default_value = "playlist.m3u")]
    input: PathBuf,

    /// Where to write the curated playlist
    #[arg(short, long, default_value = "playlist.sorted.m3u")]
    output: PathBuf,

    /// Curation config (JSON). Defaults to curation.json in the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of chunks to parse in parallel (default: one per core)
    #[arg(long)]
    chunks: Option<usize>,

    /// Print how every channel name is classified and exit
    #[arg(long)]
    classify: bool,

    /// With --classify, print one JSON object per channel
    #[arg(long, requires = "classify")]
    json: bool,

    /// Also write the curation report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct ClassifiedChannel<'a> {
    index: usize,
    name: &'a str,
    classification: m3u_curator_lib::Classification,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        match err.downcast_ref::<PlaylistError>() {
            Some(playlist_err) => eprintln!("{}", playlist_err.diagnostics()),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    let parser = match args.chunks {
        Some(n) => PlaylistParser::with_chunks(n),
        None => PlaylistParser::new(),
    };
    let playlist = parser.parse_file(&args.input)?;
    info!(
        "parsed {} channels from {}",
        playlist.len(),
        args.input.display()
    );

    if args.classify {
        for (index, channel) in playlist.channels().iter().enumerate() {
            let classification = m3u_curator_lib::classify_name(&channel.name);
            if args.json {
                let row = ClassifiedChannel {
                    index,
                    name: &channel.name,
                    classification,
                };
                println!("{}", serde_json::to_string(&row)?);
            } else {
                println!("{}\t{} -> {}", index, channel.name, classification);
            }
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => CurationConfig::load(path)?,
        None => CurationConfig::load_default()?,
    };
    let engine = CurationEngine::new(config);
    let curated = engine.curate(&playlist);
    let report = &curated.report;
    info!(
        "kept {} of {} channels ({} in catalog order, {} unmatched)",
        report.kept, report.source_channels, report.catalog_slots_filled, report.overflow
    );
    info!(
        "dropped: {} by region, {} by name, {} by country code",
        report.dropped_region, report.dropped_name, report.dropped_country_code
    );
    info!("country codes seen: {:?}", report.country_codes_seen);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote report to {}", path.display());
    }

    m3u_curator_lib::dumpf(&curated.playlist, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("wrote {}", args.output.display());
    Ok(())
}
