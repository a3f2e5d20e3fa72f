//! Flag groups
//!
//! Settings are registered into titled [`FlagSet`]s held by a
//! [`NamedFlagSets`] registry. The registry keeps registration order so that
//! help output is grouped and stable, and it is the single place where
//! duplicate flag names are detected.

pub mod flag_set;
pub mod named;
pub mod values;


pub use flag_set::{parse_duration, Flag, FlagSet, ValueKind};
pub use named::{flag_usages, print_sections, NamedFlagSets};
pub use values::{get_bool, get_duration, get_int, get_int_as, get_opt_string, get_string, get_string_array};
