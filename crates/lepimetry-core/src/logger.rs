//! Stderr logger for batch measurement runs.
//!
//! Every line names the stage crate that emitted it and the specimen being
//! processed, so a failure deep inside a long batch can be traced back to
//! its image:
//!
//! ```text
//! [  0.125s  INFO ruler    IMG_0042.JPG] tick spacing 9.98 px
//! ```
//!
//! Drivers wrap the work on each image in [`specimen_scope`]. Lines logged
//! outside any scope show `-` in the specimen column.

use std::cell::RefCell;
use std::fmt::Display;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

thread_local! {
    static SPECIMEN: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Guard returned by [`specimen_scope`]; restores the enclosing specimen
/// name when dropped.
#[must_use = "the specimen name is cleared as soon as the scope is dropped"]
#[derive(Debug)]
pub struct SpecimenScope {
    previous: Option<String>,
}

impl Drop for SpecimenScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SPECIMEN.with(|s| *s.borrow_mut() = previous);
    }
}

/// Tag log lines from this thread with `name` until the guard is dropped.
pub fn specimen_scope(name: impl Into<String>) -> SpecimenScope {
    let previous = SPECIMEN.with(|s| s.replace(Some(name.into())));
    SpecimenScope { previous }
}

/// Specimen name of the innermost active scope on this thread.
pub fn current_specimen() -> Option<String> {
    SPECIMEN.with(|s| s.borrow().clone())
}

/// `lepimetry_ruler::estimator` -> `ruler`; foreign targets keep their crate name.
fn stage(target: &str) -> &str {
    let krate = target.split("::").next().unwrap_or(target);
    krate.strip_prefix("lepimetry_").unwrap_or(krate)
}

fn format_line(
    elapsed: f64,
    level: Level,
    target: &str,
    specimen: Option<&str>,
    message: impl Display,
) -> String {
    format!(
        "[{:7.3}s {:>5} {:<8} {}] {}",
        elapsed,
        level,
        stage(target),
        specimen.unwrap_or("-"),
        message
    )
}

struct BatchLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for BatchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = SPECIMEN.with(|s| {
            format_line(
                self.started.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                s.borrow().as_deref(),
                record.args(),
            )
        });
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<BatchLogger> = OnceLock::new();

/// Install the batch logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| BatchLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber; `RUST_LOG` overrides the `info` default.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_carry_stage_and_specimen() {
        let line = format_line(
            0.125,
            Level::Info,
            "lepimetry_ruler::estimator",
            Some("IMG_0042.JPG"),
            "tick spacing 9.98 px",
        );
        assert_eq!(line, "[  0.125s  INFO ruler    IMG_0042.JPG] tick spacing 9.98 px");

        let line = format_line(2.0, Level::Warn, "other_crate", None, "x");
        assert_eq!(line, "[  2.000s  WARN other_crate -] x");
    }

    #[test]
    fn scopes_nest_and_restore() {
        assert_eq!(current_specimen(), None);
        {
            let _outer = specimen_scope("a.jpg");
            {
                let _inner = specimen_scope("b.jpg");
                assert_eq!(current_specimen().as_deref(), Some("b.jpg"));
            }
            assert_eq!(current_specimen().as_deref(), Some("a.jpg"));
        }
        assert_eq!(current_specimen(), None);
    }
}
