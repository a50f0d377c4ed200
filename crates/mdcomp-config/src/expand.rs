//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

struct UnsetVar(String);

/// Expand braced environment variable references in `value`.
///
/// An unset variable without a default is an error naming `field`. Strings
/// without `${` are returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(UnsetVar(var.to_owned())),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var_in_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDCOMP_TEST_THEME", "themes/dark");
        }
        let result = expand_env("${MDCOMP_TEST_THEME}/card.html", "components.Card").unwrap();
        assert_eq!(result, "themes/dark/card.html");
        unsafe {
            std::env::remove_var("MDCOMP_TEST_THEME");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDCOMP_TEST_UNSET");
        }
        let result = expand_env("${MDCOMP_TEST_UNSET:-theme}/card.html", "f").unwrap();
        assert_eq!(result, "theme/card.html");
    }

    #[test]
    fn test_unset_var_is_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDCOMP_TEST_MISSING");
        }
        let err = expand_env("${MDCOMP_TEST_MISSING}/a.html", "components.Alert").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("MDCOMP_TEST_MISSING"));
        assert!(msg.contains("components.Alert"));
    }

    #[test]
    fn test_literals_unchanged() {
        assert_eq!(expand_env("card.html", "f").unwrap(), "card.html");
        assert_eq!(expand_env("$HOME/card.html", "f").unwrap(), "$HOME/card.html");
    }
}
