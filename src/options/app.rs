//! Process-level settings: logging, leader election and probe addresses

use clap::ArgMatches;

use crate::error::Result;
use crate::flags::{get_int_as, get_string, FlagSet};

pub const LOG_LEVEL: &str = "log-level";
pub const LEADER_ELECTION_NAMESPACE: &str = "leader-election-namespace";
pub const METRICS_BIND_ADDRESS: &str = "metrics-bind-address";
pub const READINESS_PROBE_BIND_ADDRESS: &str = "readiness-probe-bind-address";

/// Value of `--metrics-bind-address` that turns the metrics server off.
pub const METRICS_DISABLED: &str = "0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AppSettings {
    pub log_level: u8,
    pub leader_election_namespace: String,
    pub metrics_address: String,
    pub readyz_address: String,
}

pub(crate) fn add_app_flags(fs: &mut FlagSet) {
    fs.int(LOG_LEVEL, 1, "Log level (1-5).")
        .shorthand('v')
        .range(1, 5);

    fs.string(
        LEADER_ELECTION_NAMESPACE,
        "",
        "Namespace to lease leader election for controller replica set.",
    );

    fs.string(
        METRICS_BIND_ADDRESS,
        ":9402",
        "TCP address for exposing HTTP Prometheus metrics which will be served on the HTTP path '/metrics'. \
         The value \"0\" will disable exposing metrics.",
    );

    fs.string(
        READINESS_PROBE_BIND_ADDRESS,
        ":6060",
        "TCP address for exposing the HTTP readiness probe which will be served on the HTTP path '/readyz'.",
    );
}

impl AppSettings {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            log_level: get_int_as(matches, LOG_LEVEL)?,
            leader_election_namespace: get_string(matches, LEADER_ELECTION_NAMESPACE)?,
            metrics_address: get_string(matches, METRICS_BIND_ADDRESS)?,
            readyz_address: get_string(matches, READINESS_PROBE_BIND_ADDRESS)?,
        })
    }
}
