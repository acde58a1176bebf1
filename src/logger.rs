/// File-backed tracing subscriber.
///
/// The terminal is in raw alternate-screen mode while the game runs, so
/// events go to a file instead of stderr, one plain-text line each.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;

fn subscriber(file: File, level: LevelFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .with_ansi(false)
        .with_target(true)
        .finish()
}

/// Install the file subscriber. Failure leaves logging disabled and is
/// reported on stderr (the terminal is not in raw mode yet).
pub fn init(path: &Path, level: LevelFilter) {
    if level == LevelFilter::OFF {
        return;
    }
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };
    if let Err(e) = tracing::subscriber::set_global_default(subscriber(file, level)) {
        eprintln!("Warning: logger already set: {e}");
    }
}
