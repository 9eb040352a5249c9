// In: src/logging.rs

//! Opt-in console or file logging for embedding applications.
//!
//! The library itself only emits through the `log` facade. A host that wants to see
//! the walker's chunk-level progress calls `enable_verbose_logging` once at startup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::OttxError;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend printing `[LEVEL] message` lines.
///
/// With `log_file` set, output is appended to that file instead of stderr. Only the
/// first call installs a logger; later calls are no-ops. A log file that cannot be
/// opened is reported as an error and leaves logging uninitialized.
pub fn enable_verbose_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), OttxError> {
    let file = log_file.map(open_append).transpose()?;

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        // Another logger may already be installed by the host.
        let _ = builder.try_init();
    });
    Ok(())
}

fn open_append(path: &Path) -> Result<File, OttxError> {
    Ok(OpenOptions::new().append(true).create(true).open(path)?)
}
