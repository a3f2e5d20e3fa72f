//! Typed accessors for parsed flag values
//!
//! Flags registered through a [`FlagSet`](super::FlagSet) are read back from
//! the parsed `ArgMatches` with these helpers. A flag that was never added to
//! the command yields [`Error::MissingFlag`].

use std::time::Duration;

use clap::ArgMatches;

use crate::error::{Error, Result};

fn lookup<'a, T>(matches: &'a ArgMatches, name: &str) -> Result<Option<&'a T>>
where
    T: std::any::Any + Clone + Send + Sync + 'static,
{
    matches
        .try_get_one::<T>(name)
        .map_err(|_| Error::MissingFlag(name.to_string()))
}

/// String value, or `""` when the flag has no default and was not given.
pub fn get_string(matches: &ArgMatches, name: &str) -> Result<String> {
    Ok(lookup::<String>(matches, name)?.cloned().unwrap_or_default())
}

/// String value, treating the empty string as unset.
pub fn get_opt_string(matches: &ArgMatches, name: &str) -> Result<Option<String>> {
    Ok(Some(get_string(matches, name)?).filter(|s| !s.is_empty()))
}

pub fn get_int(matches: &ArgMatches, name: &str) -> Result<i64> {
    lookup::<i64>(matches, name)?
        .copied()
        .ok_or_else(|| Error::MissingFlag(name.to_string()))
}

/// Int value converted to a narrower integer type. Fails with
/// [`Error::InvalidValue`] when the flag's range is wider than `T`.
pub fn get_int_as<T: TryFrom<i64>>(matches: &ArgMatches, name: &str) -> Result<T> {
    let value = get_int(matches, name)?;
    T::try_from(value).map_err(|_| Error::InvalidValue {
        flag: name.to_string(),
        value: value.to_string(),
    })
}

pub fn get_bool(matches: &ArgMatches, name: &str) -> Result<bool> {
    Ok(lookup::<bool>(matches, name)?.copied().unwrap_or(false))
}

pub fn get_duration(matches: &ArgMatches, name: &str) -> Result<Duration> {
    Ok(lookup::<Duration>(matches, name)?
        .copied()
        .unwrap_or(Duration::ZERO))
}

/// All values of a repeatable flag, in command-line order.
pub fn get_string_array(matches: &ArgMatches, name: &str) -> Result<Vec<String>> {
    let values = matches
        .try_get_many::<String>(name)
        .map_err(|_| Error::MissingFlag(name.to_string()))?;
    Ok(values.map(|v| v.cloned().collect()).unwrap_or_default())
}
