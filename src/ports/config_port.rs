//! Configuration access port.

use crate::domain::error::MacrossError;

/// Read access to `[section] key = value` configuration.
///
/// Typed getters return the default when the key is absent and
/// [`MacrossError::ConfigInvalid`] when it is present but unparseable.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, MacrossError> {
        parse_or(self.get_string(section, key), section, key, default, "an integer")
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, MacrossError> {
        parse_or(self.get_string(section, key), section, key, default, "a number")
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, MacrossError> {
    match value {
        None => Ok(default),
        Some(s) if s.trim().is_empty() => Ok(default),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, &format!("expected {expected}, got '{s}'"))),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> MacrossError {
    MacrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
