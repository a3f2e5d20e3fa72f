//! Installing the logger when another subscriber already owns the process
//! default. Kept in its own binary because the default is process-wide.

use approver_policy::{Error, Logger};
use tracing::Dispatch;

#[test]
fn install_keeps_failing_after_foreign_default() {
    tracing::dispatcher::set_global_default(Dispatch::none()).unwrap();

    let logger = Logger::new(2);
    assert!(matches!(logger.install(), Err(Error::Logging(_))));
    // A retry must not report success for a logger that was never installed.
    assert!(matches!(logger.install(), Err(Error::Logging(_))));
    assert!(matches!(Logger::new(2).install(), Err(Error::Logging(_))));
}
