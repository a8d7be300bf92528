use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::Parser;
use ipod_scrobbler::history::load_history;
use ipod_scrobbler::scrobble::{LogSink, ReportBuilder, ScrobbleSink};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ipod-scrobbler")]
#[command(about = "Reconstruct a play history from an iPod database", long_about = None)]
struct Args {
    /// Path to the iPod mount point or its database directory
    #[arg(short = 'd', long, default_value = "/media/ipod")]
    device: String,

    /// Emit the reconstructed history as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Override the local UTC offset (seconds) used for legacy timestamps
    #[arg(long)]
    utc_offset: Option<i32>,

    /// Only print the most recent N plays
    #[arg(long)]
    limit: Option<usize>,

    /// Submit the history through the local logging sink (dry run)
    #[arg(long)]
    submit: bool,

    /// Events per submission batch
    #[arg(long, default_value = "50")]
    batch_size: usize,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// The database directory on a mounted device; used when the given path is
/// the mount root rather than the directory itself
const DEVICE_DB_SUBDIR: &str = "iPod_Control/iTunes";

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Expand ~ in the device path
    let device = shellexpand::tilde(&args.device);
    let mut database_dir = PathBuf::from(device.as_ref());
    if database_dir.join(DEVICE_DB_SUBDIR).is_dir() {
        database_dir = database_dir.join(DEVICE_DB_SUBDIR);
    }

    // Legacy timestamps were written in device-local wall-clock time; the
    // offset applied here must match the machine the history belongs to.
    let utc_offset = args
        .utc_offset
        .unwrap_or_else(|| Local::now().offset().local_minus_utc());
    log::info!("decoding database in {database_dir:?} (utc offset {utc_offset}s)");

    let mut events = load_history(&database_dir, utc_offset)?;
    log::info!("reconstructed {} plays", events.len());

    if let Some(limit) = args.limit {
        events.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        for event in &events {
            let when = Local
                .timestamp_opt(event.played_at_unix, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| event.played_at_unix.to_string());
            println!(
                "{}  {} - {} [{}]",
                when, event.track.artist, event.track.title, event.track.album
            );
        }
    }

    if args.submit {
        let mut sink = LogSink::new();
        let builder = ReportBuilder::new().with_batch_size(args.batch_size);
        for batch in builder.batches(&events) {
            let outcome = sink.submit(batch)?;
            log::debug!(
                "batch done: {} accepted, {} rejected",
                outcome.accepted,
                outcome.rejected
            );
        }
        log::info!("dry-run submission complete: {} events", sink.submitted());
    }

    Ok(())
}
