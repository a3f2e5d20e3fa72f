//! Error types for option composition

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Two flag groups registered the same flag name or shorthand
    #[error("flag {flag} in group {group:?} redefined: already registered by group {previous:?}")]
    FlagRedefined {
        flag: String,
        group: String,
        previous: String,
    },

    /// An `Options` phase was invoked out of order
    #[error("options are {actual}, expected {expected}")]
    Phase {
        expected: &'static str,
        actual: &'static str,
    },

    /// A registered flag has no value in the parsed matches
    #[error("flag --{0} was not registered with the parsed command")]
    MissingFlag(String),

    /// A parsed flag value does not fit the setting it configures
    #[error("invalid value {value:?} for flag --{flag}")]
    InvalidValue { flag: String, value: String },

    /// Building the Kubernetes client config failed
    #[error("failed to build kubernetes rest config: {0}")]
    RestConfig(String),

    /// Installing the process-wide log subscriber failed
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
