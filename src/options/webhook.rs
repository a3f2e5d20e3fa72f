//! Webhook serving settings

use clap::ArgMatches;

use crate::error::Result;
use crate::flags::{get_int_as, get_string, FlagSet};

pub const WEBHOOK_HOST: &str = "webhook-host";
pub const WEBHOOK_PORT: &str = "webhook-port";
pub const WEBHOOK_SERVICE_NAME: &str = "webhook-service-name";
pub const WEBHOOK_CA_SECRET_NAMESPACE: &str = "webhook-ca-secret-namespace";

/// Accepted for compatibility with older deployments and otherwise ignored.
pub const WEBHOOK_CERTIFICATE_DIR: &str = "webhook-certificate-dir";

/// Options for serving the approver-policy webhook
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Webhook {
    /// Host the webhook is served on.
    pub host: String,

    /// TCP port the webhook is served on.
    pub port: u16,

    /// Kubernetes Service that exposes the webhook server.
    pub service_name: String,

    /// Namespace holding the cert-manager-approver-policy-tls Secret.
    pub ca_secret_namespace: String,
}

pub(crate) fn add_webhook_flags(fs: &mut FlagSet) {
    fs.string(WEBHOOK_HOST, "0.0.0.0", "Host to serve webhook.");

    fs.int(WEBHOOK_PORT, 6443, "Port to serve webhook.")
        .range(1, u16::MAX as i64);

    fs.string(
        WEBHOOK_SERVICE_NAME,
        "cert-manager-approver-policy",
        "Name of the Kubernetes Service that exposes the Webhook's server.",
    );

    fs.string(
        WEBHOOK_CA_SECRET_NAMESPACE,
        "cert-manager",
        "Namespace that the cert-manager-approver-policy-tls Secret is stored.",
    );

    // Parsed but never bound.
    fs.string(
        WEBHOOK_CERTIFICATE_DIR,
        "/tmp",
        "Directory where the Webhook certificate and private key are located. \
         Certificate and private key must be named 'tls.crt' and 'tls.key' respectively.",
    )
    .deprecated("webhook-certificate-dir is deprecated");
}

impl Webhook {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            host: get_string(matches, WEBHOOK_HOST)?,
            port: get_int_as(matches, WEBHOOK_PORT)?,
            service_name: get_string(matches, WEBHOOK_SERVICE_NAME)?,
            ca_secret_namespace: get_string(matches, WEBHOOK_CA_SECRET_NAMESPACE)?,
        })
    }
}
