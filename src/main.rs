use anyhow::Context;
use approver_policy::{Approver, Options};
use clap::Command;
use tracing::info;

const LONG_ABOUT: &str = "approver-policy is a cert-manager approver that will \
approve or deny CertificateRequests based on CRD defined policies.";

fn command() -> Command {
    Command::new("approver-policy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("cert-manager approver for CertificateRequest policy")
        .long_about(LONG_ABOUT)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Approvers contributing flag groups are linked in here.
    let approvers: Vec<&dyn Approver> = Vec::new();

    let mut options = Options::new();
    let cmd = options
        .prepare(command(), &approvers)
        .context("failed to register flags")?;

    let matches = match cmd.try_get_matches() {
        Ok(matches) => matches,
        Err(err) if err.use_stderr() => {
            let rendered = err.render().to_string();
            eprint!("{rendered}");
            if !rendered.contains("Usage:") {
                eprint!("\n{}", options.usage());
            }
            std::process::exit(err.exit_code());
        }
        Err(err) => err.exit(),
    };

    let config = options.complete(&matches).await?;
    config.logger.install()?;

    info!(
        "Starting approver-policy v{} (log level {})",
        env!("CARGO_PKG_VERSION"),
        config.log_level
    );
    info!(
        "Webhook serving on {}:{} for service {}, CA secret namespace {}",
        config.webhook.host,
        config.webhook.port,
        config.webhook.service_name,
        config.webhook.ca_secret_namespace
    );
    if config.metrics_enabled() {
        info!("Metrics bind address {}", config.metrics_address);
    } else {
        info!("Metrics server disabled");
    }
    info!("Readiness probe bind address {}", config.readyz_address);
    if config.leader_election_namespace.is_empty() {
        info!("Leader election in the pod namespace");
    } else {
        info!(
            "Leader election in namespace {}",
            config.leader_election_namespace
        );
    }
    info!("Kubernetes API server {}", config.rest_config.cluster_url);

    Ok(())
}
