//! Command line options for approver-policy
//!
//! [`Options`] composes the process flags, the webhook flags, the Kubernetes
//! client flags and one flag group per approver onto a single `clap::Command`,
//! then turns the parsed matches into a [`Config`].
//!
//! The lifecycle is strictly ordered:
//!
//! 1. [`Options::new`]
//! 2. [`Options::prepare`] registers every group and returns the command to parse
//! 3. the caller parses arguments with the returned command
//! 4. [`Options::complete`] builds the logger and the Kubernetes client config
//!
//! # Example
//!
//! ```rust,ignore
//! let mut options = Options::new();
//! let cmd = options.prepare(Command::new("approver-policy"), &approvers)?;
//! let matches = cmd.get_matches();
//! let config = options.complete(&matches).await?;
//! ```

pub mod app;
pub mod cluster;
pub mod webhook;

#[cfg(test)]
mod options_test;

use clap::{ArgMatches, Command};
use tracing::{debug, warn};

use crate::approver::Approver;
use crate::error::{Error, Result};
use crate::flags::NamedFlagSets;
use crate::telemetry::Logger;

pub use app::METRICS_DISABLED;
pub use cluster::KubeConfigFlags;
pub use webhook::Webhook;

/// Title of the process flag group.
pub const APP_FLAGS: &str = "App";
/// Title of the webhook flag group.
pub const WEBHOOK_FLAGS: &str = "Webhook";
/// Title of the Kubernetes client flag group.
pub const KUBERNETES_FLAGS: &str = "Kubernetes";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Constructed,
    Prepared,
    Completed,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Constructed => "constructed",
            Phase::Prepared => "prepared",
            Phase::Completed => "completed",
        }
    }
}

/// Finalized configuration for the approver-policy process
#[derive(Clone, Debug)]
pub struct Config {
    /// Verbosity the logger was built at.
    pub log_level: u8,

    /// Namespace to lease leader election in. Empty means the pod's own
    /// namespace.
    pub leader_election_namespace: String,

    /// TCP address for the Prometheus metrics server. [`METRICS_DISABLED`]
    /// turns it off.
    pub metrics_address: String,

    /// TCP address for the readiness probe server.
    pub readyz_address: String,

    pub webhook: Webhook,

    /// Shared base client config for the Kubernetes API.
    pub rest_config: kube::Config,

    /// Shared base logger.
    pub logger: Logger,

    /// Parsed command line; approvers read their own flags from here.
    pub flags: ArgMatches,
}

impl Config {
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_address != METRICS_DISABLED
    }
}

/// Flag registration and completion for the process configuration
#[derive(Debug)]
pub struct Options {
    phase: Phase,
    flag_sets: NamedFlagSets,
    kube_config_flags: KubeConfigFlags,
    usage: String,
    help: String,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    pub fn new() -> Self {
        Self {
            phase: Phase::Constructed,
            flag_sets: NamedFlagSets::new(),
            kube_config_flags: KubeConfigFlags::new(),
            usage: String::new(),
            help: String::new(),
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::Phase {
                expected: expected.as_str(),
                actual: self.phase.as_str(),
            });
        }
        Ok(())
    }

    /// Register all flag groups onto `cmd` and install the grouped help text.
    ///
    /// Groups are registered as `App`, `Webhook`, `Kubernetes`, then one group
    /// per approver in the order given. Fails if any flag name or shorthand is
    /// defined twice.
    pub fn prepare(&mut self, cmd: Command, approvers: &[&dyn Approver]) -> Result<Command> {
        self.expect_phase(Phase::Constructed)?;

        app::add_app_flags(self.flag_sets.flag_set(APP_FLAGS));
        webhook::add_webhook_flags(self.flag_sets.flag_set(WEBHOOK_FLAGS));
        self.kube_config_flags
            .add_flags(self.flag_sets.flag_set(KUBERNETES_FLAGS));

        for approver in approvers {
            approver.register_flags(self.flag_sets.flag_set(approver.name()));
        }

        self.flag_sets.validate()?;

        let use_line = format!("{} [flags]", cmd.get_name());
        let sections = self.flag_sets.sections(0);
        let long_about = cmd
            .get_long_about()
            .or_else(|| cmd.get_about())
            .map(ToString::to_string)
            .unwrap_or_default();

        self.usage = format!("Usage:\n  {use_line}\n{sections}");
        self.help = format!("{long_about}\n\n{}", self.usage);

        // Parse errors that carry usage show the grouped sections too.
        let mut cmd = cmd
            .override_help(self.help.clone())
            .override_usage(format!("{use_line}\n{sections}"));
        for set in self.flag_sets.iter() {
            for flag in set.flags() {
                cmd = cmd.arg(flag.to_arg().help_heading(set.name().to_string()));
            }
        }

        self.phase = Phase::Prepared;
        Ok(cmd)
    }

    /// Build the final configuration from parsed matches.
    ///
    /// Must be called after the command returned by [`Options::prepare`] has
    /// parsed the process arguments. Fails if the Kubernetes client config
    /// cannot be built.
    pub async fn complete(&mut self, matches: &ArgMatches) -> Result<Config> {
        self.expect_phase(Phase::Prepared)?;
        self.phase = Phase::Completed;

        let app = app::AppSettings::from_matches(matches)?;
        let webhook = Webhook::from_matches(matches)?;
        self.kube_config_flags.bind(matches)?;

        let logger = Logger::new(app.log_level);
        let warnings = self.flag_sets.deprecation_warnings(matches);
        logger.in_scope(|| {
            for warning in &warnings {
                warn!("{}", warning);
            }
        });

        let rest_config = self.kube_config_flags.to_rest_config().await?;

        logger.in_scope(|| {
            debug!(
                "Built Kubernetes client config for {}",
                rest_config.cluster_url
            )
        });

        Ok(Config {
            log_level: app.log_level,
            leader_election_namespace: app.leader_election_namespace,
            metrics_address: app.metrics_address,
            readyz_address: app.readyz_address,
            webhook,
            rest_config,
            logger,
            flags: matches.clone(),
        })
    }

    /// Usage text with every flag section, available after prepare.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Full help text, available after prepare.
    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn flag_sets(&self) -> &NamedFlagSets {
        &self.flag_sets
    }

    /// Kubernetes client settings; populated once complete has run.
    pub fn kube_config_flags(&self) -> &KubeConfigFlags {
        &self.kube_config_flags
    }
}
