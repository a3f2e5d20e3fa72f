//! Approver plugin interface
//!
//! Approvers are the decision modules that evaluate CertificateRequests. The
//! option layer only needs to know what each one is called and which flags it
//! wants; everything else about an approver is opaque here.

use crate::flags::FlagSet;

/// A pluggable decision module contributing its own flag group.
///
/// Each approver gets a flag set titled with [`Approver::name`]. Values are
/// read back after completion from [`Config::flags`](crate::options::Config)
/// using the helpers in [`crate::flags`].
pub trait Approver {
    /// Name of the approver, used as the title of its flag group.
    fn name(&self) -> &str;

    /// Register the approver's flags. Flag names must not collide with any
    /// other group.
    fn register_flags(&self, fs: &mut FlagSet);
}
