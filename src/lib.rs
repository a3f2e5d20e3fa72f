//! approver-policy: option composition for the cert-manager approver-policy
//! webhook
//!
//! This crate gathers the process flags, the webhook serving flags, the
//! Kubernetes client flags and the flags contributed by each approver into a
//! single command line, and turns the parsed result into a [`Config`].

pub mod approver;
pub mod error;
pub mod flags;
pub mod options;
pub mod telemetry;

pub use crate::approver::Approver;
pub use crate::error::{Error, Result};
pub use crate::options::{Config, Options, Webhook};
pub use crate::telemetry::Logger;
