//! VenueFuse CLI - Command-line interface
//!
//! Replays a recorded location script through the playback engine and
//! prints every listener callback, for inspecting the consumer-visible
//! event sequence without live positioning signals.

use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use venuefuse::location::{
    LocationListener, LocationProducer, LocationUpdate, PlaybackConfig, PlaybackLocationProducer,
};

#[derive(Parser)]
#[command(name = "venuefuse")]
#[command(version = venuefuse::VERSION)]
#[command(about = "Replay recorded location scripts through the VenueFuse engine", long_about = None)]
struct Args {
    /// Path to the playback script (a JSON array of events)
    script: std::path::PathBuf,

    /// Delay between dispatched events in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Restart from the first event after the last one (stop with Ctrl-C)
    #[arg(long = "loop")]
    looping: bool,
}

/// Prints every callback the playback engine dispatches.
struct ConsoleListener;

impl LocationListener for ConsoleListener {
    fn on_location_changed(&mut self, update: &LocationUpdate) {
        println!("location       {}", update);
    }

    fn on_floor_changed(
        &mut self,
        venue_id: Option<&str>,
        floor_id: Option<&str>,
        floor_level: Option<&str>,
    ) {
        println!(
            "floor-changed  venue={} floor={} level={}",
            venue_id.unwrap_or("-"),
            floor_id.unwrap_or("-"),
            floor_level.unwrap_or("-")
        );
    }

    fn on_enter_indoors(&mut self, venue_id: Option<&str>) {
        println!("enter-indoors  venue={}", venue_id.unwrap_or("-"));
    }

    fn on_exit_indoors(&mut self, venue_id: Option<&str>) {
        println!("exit-indoors   venue={}", venue_id.unwrap_or("-"));
    }

    fn on_enter_venue(&mut self, venue_id: &str, venue_name: Option<&str>) {
        println!(
            "enter-venue    venue={} name={}",
            venue_id,
            venue_name.unwrap_or("-")
        );
    }

    fn on_exit_venue(&mut self, venue_id: Option<&str>) {
        println!("exit-venue     venue={}", venue_id.unwrap_or("-"));
    }
}

/// Count the script's events up front so a finite run knows when to exit.
fn read_event_count(path: &Path) -> Result<usize, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let document: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| format!("{} is not valid JSON: {}", path.display(), e))?;
    match document.as_array() {
        Some(events) => Ok(events.len()),
        None => Err(format!("{} must be a JSON array of events", path.display())),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let event_count = match read_event_count(&args.script) {
        Ok(count) => count,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };
    if event_count == 0 {
        eprintln!("Error: {} contains no events", args.script.display());
        process::exit(1);
    }

    let delay = Duration::from_millis(args.delay_ms);
    println!(
        "Replaying {} events from {} every {}ms{}",
        event_count,
        args.script.display(),
        args.delay_ms,
        if args.looping { ", looping" } else { "" }
    );
    println!();

    tracing::debug!(script = %args.script.display(), event_count, "starting playback");
    let mut producer = PlaybackLocationProducer::with_config(
        args.script.clone(),
        PlaybackConfig {
            update_delay: delay,
            looping: args.looping,
        },
    );
    producer.set_listener(Some(Box::new(ConsoleListener)));
    if let Err(error) = producer.start() {
        eprintln!("Error: failed to start playback: {}", error);
        process::exit(1);
    }

    if args.looping {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            println!("Interrupted, stopping playback");
        }
    } else {
        // One pass: the first event fires immediately, the rest follow at
        // the configured delay. A little slack covers dispatch overhead.
        let run_time = delay * (event_count as u32) + Duration::from_millis(250);
        tokio::time::sleep(run_time).await;
    }

    producer.stop();
    producer.destroy();
}
