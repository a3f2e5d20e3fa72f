//! Kubernetes client connection flags
//!
//! `KubeConfigFlags` registers the usual kubectl-style connection flags and
//! turns their parsed values into a `kube::Config`. Loading follows the same
//! precedence as kubectl: an explicit `--kubeconfig` file, then the default
//! kubeconfig locations when a context/cluster/user is selected, then
//! in-cluster inference. When nothing can be inferred, `--server` alone is
//! enough to build a config.

use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use http::Uri;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use tracing::debug;

use crate::error::{Error, Result};
use crate::flags::{get_bool, get_duration, get_opt_string, get_string_array, FlagSet};

pub const KUBECONFIG: &str = "kubeconfig";
pub const CONTEXT: &str = "context";
pub const CLUSTER: &str = "cluster";
pub const USER: &str = "user";
pub const NAMESPACE: &str = "namespace";
pub const SERVER: &str = "server";
pub const INSECURE_SKIP_TLS_VERIFY: &str = "insecure-skip-tls-verify";
pub const IMPERSONATE: &str = "as";
pub const IMPERSONATE_GROUP: &str = "as-group";
pub const REQUEST_TIMEOUT: &str = "request-timeout";

/// Connection settings collected from the command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KubeConfigFlags {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub cluster: Option<String>,
    pub user: Option<String>,
    pub namespace: Option<String>,
    pub server: Option<String>,
    pub insecure_skip_tls_verify: bool,
    pub impersonate: Option<String>,
    pub impersonate_groups: Vec<String>,
    pub request_timeout: Duration,
}

impl KubeConfigFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_flags(&self, fs: &mut FlagSet) {
        fs.string(
            KUBECONFIG,
            "",
            "Path to the kubeconfig file to use for CLI requests.",
        );
        fs.string(CONTEXT, "", "The name of the kubeconfig context to use");
        fs.string(CLUSTER, "", "The name of the kubeconfig cluster to use");
        fs.string(USER, "", "The name of the kubeconfig user to use");
        fs.string(
            NAMESPACE,
            "",
            "If present, the namespace scope for this CLI request",
        )
        .shorthand('n');
        fs.string(
            SERVER,
            "",
            "The address and port of the Kubernetes API server",
        )
        .shorthand('s');
        fs.bool(
            INSECURE_SKIP_TLS_VERIFY,
            false,
            "If true, the server's certificate will not be checked for validity. \
             This will make your HTTPS connections insecure",
        );
        fs.string(
            IMPERSONATE,
            "",
            "Username to impersonate for the operation. \
             User could be a regular user or a service account in a namespace.",
        );
        fs.string_array(
            IMPERSONATE_GROUP,
            "Group to impersonate for the operation, \
             this flag can be repeated to specify multiple groups.",
        );
        fs.duration(
            REQUEST_TIMEOUT,
            "0",
            "The length of time to wait before giving up on a single server request. \
             Non-zero values should contain a corresponding time unit (e.g. 1s, 2m, 3h). \
             A value of zero means don't timeout requests.",
        );
    }

    /// Copy parsed values into this struct.
    pub fn bind(&mut self, matches: &ArgMatches) -> Result<()> {
        self.kubeconfig = get_opt_string(matches, KUBECONFIG)?.map(PathBuf::from);
        self.context = get_opt_string(matches, CONTEXT)?;
        self.cluster = get_opt_string(matches, CLUSTER)?;
        self.user = get_opt_string(matches, USER)?;
        self.namespace = get_opt_string(matches, NAMESPACE)?;
        self.server = get_opt_string(matches, SERVER)?;
        self.insecure_skip_tls_verify = get_bool(matches, INSECURE_SKIP_TLS_VERIFY)?;
        self.impersonate = get_opt_string(matches, IMPERSONATE)?;
        self.impersonate_groups = get_string_array(matches, IMPERSONATE_GROUP)?;
        self.request_timeout = get_duration(matches, REQUEST_TIMEOUT)?;
        Ok(())
    }

    fn kubeconfig_options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            user: self.user.clone(),
        }
    }

    /// Build the client config from the bound flags.
    pub async fn to_rest_config(&self) -> Result<Config> {
        let options = self.kubeconfig_options();
        let selects_kubeconfig_entry =
            options.context.is_some() || options.cluster.is_some() || options.user.is_some();

        let server_url = match &self.server {
            Some(server) => Some(server.parse::<Uri>().map_err(|e| {
                Error::RestConfig(format!("invalid API server address {server:?}: {e}"))
            })?),
            None => None,
        };

        let mut config = match &self.kubeconfig {
            Some(path) => {
                debug!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path).map_err(rest_config_error)?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(rest_config_error)?
            }
            None if selects_kubeconfig_entry => Config::from_kubeconfig(&options)
                .await
                .map_err(rest_config_error)?,
            None => match Config::infer().await {
                Ok(config) => config,
                // An explicit server is enough to connect without a kubeconfig.
                Err(err) => match &server_url {
                    Some(url) => {
                        debug!(
                            "No kubeconfig or in-cluster config found ({err}), using --server {url}"
                        );
                        Config::new(url.clone())
                    }
                    None => return Err(rest_config_error(err)),
                },
            },
        };

        if let Some(url) = server_url {
            config.cluster_url = url;
        }
        if let Some(namespace) = &self.namespace {
            config.default_namespace = namespace.clone();
        }
        if self.insecure_skip_tls_verify {
            config.accept_invalid_certs = true;
        }
        if let Some(user) = &self.impersonate {
            config.auth_info.impersonate = Some(user.clone());
        }
        if !self.impersonate_groups.is_empty() {
            config.auth_info.impersonate_groups = Some(self.impersonate_groups.clone());
        }
        if !self.request_timeout.is_zero() {
            config.read_timeout = Some(self.request_timeout);
        }

        Ok(config)
    }
}

fn rest_config_error(err: impl std::fmt::Display) -> Error {
    Error::RestConfig(err.to_string())
}
