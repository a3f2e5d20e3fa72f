//! Logger construction
//!
//! The logger is a plain value built once during option completion and handed
//! to whatever needs it. Installing it as the process default is a separate,
//! explicit step.

use std::sync::{Mutex, PoisonError};

use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Verbosity of the process-wide default, once one has been installed.
static INSTALLED_VERBOSITY: Mutex<Option<u8>> = Mutex::new(None);

/// Map the `--log-level` ordinal onto a tracing level.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 | 1 => LevelFilter::INFO,
        2 | 3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// A log handle bound to a verbosity level
#[derive(Clone, Debug)]
pub struct Logger {
    verbosity: u8,
    dispatch: Dispatch,
}

impl Logger {
    /// Build a stdout logger. `RUST_LOG` directives refine the level derived
    /// from `verbosity`.
    pub fn new(verbosity: u8) -> Self {
        let env_filter = EnvFilter::builder()
            .with_default_directive(level_for_verbosity(verbosity).into())
            .from_env_lossy();

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true));

        Self {
            verbosity,
            dispatch: Dispatch::new(subscriber),
        }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn level(&self) -> LevelFilter {
        level_for_verbosity(self.verbosity)
    }

    /// Run `f` with this logger as the current subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the process default.
    ///
    /// Installing again at the same verbosity is a no-op. Installing at a
    /// different verbosity fails because the default can only be set once.
    pub fn install(&self) -> Result<()> {
        let mut installed = INSTALLED_VERBOSITY
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match *installed {
            Some(verbosity) if verbosity == self.verbosity => Ok(()),
            Some(verbosity) => Err(Error::Logging(format!(
                "logger already installed at verbosity {verbosity}, cannot switch to {}",
                self.verbosity
            ))),
            None => {
                tracing::dispatcher::set_global_default(self.dispatch.clone())
                    .map_err(|e| Error::Logging(e.to_string()))?;
                *installed = Some(self.verbosity);
                Ok(())
            }
        }
    }
}
