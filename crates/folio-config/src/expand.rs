//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Only the braced forms are recognized; a string without `${` is returned
/// as is, so bare dollar signs in paths and URLs survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| match std::env::var(var) {
        Ok(val) => Ok(Some(val)),
        Err(_) => Err(UnsetVar(var.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that had no value.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_EXPAND_SET", "docs");
        }
        let result = expand_env("/srv/${FOLIO_EXPAND_SET}/content", "content.source_dir").unwrap();
        assert_eq!(result, "/srv/docs/content");
        unsafe {
            std::env::remove_var("FOLIO_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_EXPAND_UNSET");
        }
        let result = expand_env("${FOLIO_EXPAND_UNSET:-0.0.0.0}", "server.host").unwrap();
        assert_eq!(result, "0.0.0.0");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_EXPAND_MISSING");
        }
        let err = expand_env("${FOLIO_EXPAND_MISSING}", "site.base_url").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("FOLIO_EXPAND_MISSING"));
        assert!(msg.contains("site.base_url"));
    }

    #[test]
    fn test_bare_dollar_untouched() {
        assert_eq!(expand_env("$HOME/docs", "content.source_dir").unwrap(), "$HOME/docs");
        assert_eq!(expand_env("plain", "server.host").unwrap(), "plain");
    }
}
