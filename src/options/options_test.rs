//! Tests for option registration and completion

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use clap::{ArgMatches, Command};
    use tempfile::NamedTempFile;

    use crate::approver::Approver;
    use crate::error::Error;
    use crate::flags::{get_string, FlagSet};
    use crate::options::{Config, Options, Webhook};

    const KUBECONFIG: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: test
  cluster:
    server: https://127.0.0.1:6443
contexts:
- name: test
  context:
    cluster: test
    user: test
    namespace: approver
current-context: test
users:
- name: test
  user:
    token: test-token
"#;

    struct TestApprover {
        name: &'static str,
        flag: &'static str,
    }

    impl Approver for TestApprover {
        fn name(&self) -> &str {
            self.name
        }

        fn register_flags(&self, fs: &mut FlagSet) {
            fs.string(self.flag, "", "Test approver flag.");
        }
    }

    fn kubeconfig_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn command() -> Command {
        Command::new("approver-policy").long_about("Test approver-policy.")
    }

    fn prepare(approvers: &[&dyn Approver], args: &[&str]) -> (Options, ArgMatches) {
        let mut options = Options::new();
        let cmd = options.prepare(command(), approvers).unwrap();
        let mut argv = vec!["approver-policy"];
        argv.extend_from_slice(args);
        let matches = cmd.try_get_matches_from(argv).unwrap();
        (options, matches)
    }

    async fn complete(approvers: &[&dyn Approver], args: &[&str]) -> Config {
        let kubeconfig = kubeconfig_file(KUBECONFIG);
        let path = kubeconfig.path().to_str().unwrap().to_string();
        let mut argv = vec!["--kubeconfig", path.as_str()];
        argv.extend_from_slice(args);
        let (mut options, matches) = prepare(approvers, &argv);
        options.complete(&matches).await.unwrap()
    }

    fn default_webhook() -> Webhook {
        Webhook {
            host: "0.0.0.0".to_string(),
            port: 6443,
            service_name: "cert-manager-approver-policy".to_string(),
            ca_secret_namespace: "cert-manager".to_string(),
        }
    }

    fn assert_defaults(config: &Config) {
        assert_eq!(config.log_level, 1);
        assert_eq!(config.leader_election_namespace, "");
        assert_eq!(config.metrics_address, ":9402");
        assert_eq!(config.readyz_address, ":6060");
        assert_eq!(config.webhook, default_webhook());
    }

    #[tokio::test]
    async fn test_defaults() {
        let config = complete(&[], &[]).await;

        assert_defaults(&config);
        assert!(config.metrics_enabled());
        assert_eq!(config.logger.verbosity(), 1);
        assert_eq!(config.rest_config.cluster_url.host(), Some("127.0.0.1"));
        assert_eq!(config.rest_config.cluster_url.port_u16(), Some(6443));
        assert_eq!(config.rest_config.default_namespace, "approver");
    }

    #[tokio::test]
    async fn test_metrics_disabled_sentinel() {
        let config = complete(&[], &["--metrics-bind-address=0"]).await;

        assert_eq!(config.metrics_address, "0");
        assert!(!config.metrics_enabled());
        assert_eq!(config.log_level, 1);
        assert_eq!(config.leader_election_namespace, "");
        assert_eq!(config.readyz_address, ":6060");
        assert_eq!(config.webhook, default_webhook());
    }

    #[tokio::test]
    async fn test_flags_bind_to_config() {
        let config = complete(
            &[],
            &[
                "-v",
                "4",
                "--leader-election-namespace=leases",
                "--readiness-probe-bind-address=:8080",
                "--webhook-host=127.0.0.1",
                "--webhook-port=10250",
                "--webhook-service-name=policy",
                "--webhook-ca-secret-namespace=security",
            ],
        )
        .await;

        assert_eq!(config.log_level, 4);
        assert_eq!(config.logger.verbosity(), 4);
        assert_eq!(config.leader_election_namespace, "leases");
        assert_eq!(config.readyz_address, ":8080");
        assert_eq!(
            config.webhook,
            Webhook {
                host: "127.0.0.1".to_string(),
                port: 10250,
                service_name: "policy".to_string(),
                ca_secret_namespace: "security".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_deprecated_certificate_dir_is_ignored() {
        let config = complete(&[], &["--webhook-certificate-dir=/etc/webhook/certs"]).await;
        assert_defaults(&config);
    }

    #[test]
    fn test_help_marks_certificate_dir_deprecated() {
        let (options, _) = prepare(&[], &[]);
        let help = options.help();

        assert!(help.contains("--webhook-certificate-dir string"));
        assert!(help.contains("(DEPRECATED: webhook-certificate-dir is deprecated)"));
    }

    #[test]
    fn test_help_layout() {
        let (options, _) = prepare(&[], &[]);

        assert!(options
            .help()
            .starts_with("Test approver-policy.\n\nUsage:\n  approver-policy [flags]\n"));
        assert!(options
            .usage()
            .starts_with("Usage:\n  approver-policy [flags]\n\nApp flags:\n\n"));

        let help = options.help();
        let app = help.find("\nApp flags:\n").unwrap();
        let webhook = help.find("\nWebhook flags:\n").unwrap();
        let kubernetes = help.find("\nKubernetes flags:\n").unwrap();
        assert!(app < webhook && webhook < kubernetes);

        assert!(help.contains("  -v, --log-level int"));
        assert!(help.contains("(default \":9402\")"));
        assert!(help.contains("--kubeconfig string"));
        assert!(help.contains("--as-group stringArray"));
    }

    #[test]
    fn test_approver_sections_follow_supplied_order() {
        let a = TestApprover {
            name: "A",
            flag: "a-flag",
        };
        let b = TestApprover {
            name: "B",
            flag: "b-flag",
        };

        let (forward, _) = prepare(&[&a, &b], &[]);
        let help = forward.help();
        assert_eq!(help.matches("\nA flags:\n").count(), 1);
        assert_eq!(help.matches("\nB flags:\n").count(), 1);
        let kubernetes = help.find("\nKubernetes flags:\n").unwrap();
        let section_a = help.find("\nA flags:\n").unwrap();
        let section_b = help.find("\nB flags:\n").unwrap();
        assert!(kubernetes < section_a && section_a < section_b);

        let (reverse, _) = prepare(&[&b, &a], &[]);
        let help = reverse.help();
        assert!(help.find("\nB flags:\n").unwrap() < help.find("\nA flags:\n").unwrap());
    }

    #[tokio::test]
    async fn test_approver_reads_own_flag() {
        let approver = TestApprover {
            name: "A",
            flag: "a-flag",
        };
        let config = complete(&[&approver], &["--a-flag=value"]).await;

        assert_eq!(get_string(&config.flags, "a-flag").unwrap(), "value");
        assert_defaults(&config);
    }

    #[test]
    fn test_colliding_approver_flag_is_rejected() {
        let approver = TestApprover {
            name: "Greedy",
            flag: "webhook-port",
        };
        let mut options = Options::new();

        match options.prepare(command(), &[&approver]) {
            Err(Error::FlagRedefined {
                flag,
                group,
                previous,
            }) => {
                assert_eq!(flag, "--webhook-port");
                assert_eq!(group, "Greedy");
                assert_eq!(previous, "Webhook");
            }
            other => panic!("expected FlagRedefined, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_port_is_a_parse_error() {
        let mut options = Options::new();
        let cmd = options.prepare(command(), &[]).unwrap();

        assert!(cmd
            .clone()
            .try_get_matches_from(["approver-policy", "--webhook-port=0"])
            .is_err());
        assert!(cmd
            .try_get_matches_from(["approver-policy", "--webhook-port=70000"])
            .is_err());
    }

    #[tokio::test]
    async fn test_malformed_kubeconfig_fails_completion() {
        let kubeconfig = kubeconfig_file("clusters: [this is not: a kubeconfig");
        let path = kubeconfig.path().to_str().unwrap().to_string();
        let (mut options, matches) = prepare(&[], &["--kubeconfig", path.as_str()]);

        match options.complete(&matches).await {
            Err(err @ Error::RestConfig(_)) => {
                assert!(err
                    .to_string()
                    .starts_with("failed to build kubernetes rest config: "));
            }
            other => panic!("expected RestConfig error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_fails_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        let path = path.to_str().unwrap().to_string();
        let (mut options, matches) = prepare(&[], &["--kubeconfig", path.as_str()]);

        let err = options.complete(&matches).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to build kubernetes rest config"));
    }

    #[tokio::test]
    async fn test_kubernetes_overrides_apply() {
        let config = complete(
            &[],
            &[
                "--server=https://10.0.0.1:443",
                "-n",
                "other",
                "--insecure-skip-tls-verify",
                "--as=system:serviceaccount:cert-manager:approver",
                "--as-group=system:masters",
                "--as-group=approvers",
                "--request-timeout=30s",
            ],
        )
        .await;

        let rest = &config.rest_config;
        assert_eq!(rest.cluster_url.host(), Some("10.0.0.1"));
        assert_eq!(rest.cluster_url.port_u16(), Some(443));
        assert_eq!(rest.default_namespace, "other");
        assert!(rest.accept_invalid_certs);
        assert_eq!(
            rest.auth_info.impersonate.as_deref(),
            Some("system:serviceaccount:cert-manager:approver")
        );
        assert_eq!(
            rest.auth_info.impersonate_groups,
            Some(vec!["system:masters".to_string(), "approvers".to_string()])
        );
        assert_eq!(rest.read_timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_phases_are_ordered_and_not_repeatable() {
        let mut options = Options::new();
        let unprepared = Command::new("approver-policy")
            .try_get_matches_from(["approver-policy"])
            .unwrap();
        assert!(matches!(
            options.complete(&unprepared).await,
            Err(Error::Phase {
                expected: "prepared",
                actual: "constructed"
            })
        ));

        let cmd = options.prepare(command(), &[]).unwrap();
        assert!(matches!(
            options.prepare(command(), &[]),
            Err(Error::Phase { .. })
        ));

        let kubeconfig = kubeconfig_file(KUBECONFIG);
        let matches = cmd
            .try_get_matches_from([
                "approver-policy",
                "--kubeconfig",
                kubeconfig.path().to_str().unwrap(),
            ])
            .unwrap();
        assert!(options.complete(&matches).await.is_ok());
        assert!(matches!(
            options.complete(&matches).await,
            Err(Error::Phase {
                expected: "prepared",
                actual: "completed"
            })
        ));
    }

    #[tokio::test]
    async fn test_independent_runs_are_identical() {
        let first = complete(&[], &["--metrics-bind-address=0"]).await;
        let second = complete(&[], &["--metrics-bind-address=0"]).await;

        assert_eq!(first.log_level, second.log_level);
        assert_eq!(
            first.leader_election_namespace,
            second.leader_election_namespace
        );
        assert_eq!(first.metrics_address, second.metrics_address);
        assert_eq!(first.readyz_address, second.readyz_address);
        assert_eq!(first.webhook, second.webhook);
        assert_eq!(
            first.rest_config.cluster_url,
            second.rest_config.cluster_url
        );
        assert_eq!(
            first.rest_config.default_namespace,
            second.rest_config.default_namespace
        );
        assert_eq!(first.logger.verbosity(), second.logger.verbosity());
    }

    #[test]
    fn test_log_level_accepts_one_through_five() {
        let mut options = Options::new();
        let cmd = options.prepare(command(), &[]).unwrap();

        for level in ["1", "5"] {
            assert!(cmd
                .clone()
                .try_get_matches_from(["approver-policy", "-v", level])
                .is_ok());
        }
        for level in ["0", "6", "-1"] {
            assert!(cmd
                .clone()
                .try_get_matches_from(["approver-policy", "--log-level", level])
                .is_err());
        }
    }

    #[tokio::test]
    async fn test_invalid_server_fails_completion() {
        let kubeconfig = kubeconfig_file(KUBECONFIG);
        let path = kubeconfig.path().to_str().unwrap().to_string();
        let (mut options, matches) = prepare(
            &[],
            &["--kubeconfig", path.as_str(), "--server", "https://bad host"],
        );

        let err = options.complete(&matches).await.unwrap_err();
        assert!(err
            .to_string()
            .starts_with("failed to build kubernetes rest config: invalid API server address"));
    }
}
