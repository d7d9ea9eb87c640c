//! `${VAR}` and `${VAR:-default}` expansion for string settings.
//!
//! Values containing no `${` are returned as-is, so strings such as
//! `<$ifname>` survive untouched.

use crate::ConfigError;

/// Lookup failure carried out of the `shellexpand` callback.
struct MissingVar {
    name: String,
}

/// Expand environment references in `value`.
///
/// `field` is the dotted config key, reported when a referenced variable
/// is unset and has no default.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| -> Result<Option<String>, MissingVar> {
        std::env::var(name).map(Some).map_err(|_| MissingVar {
            name: name.to_owned(),
        })
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.name),
        })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value.as_deref() {
        *value = Some(expand_env(v, field)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_password_from_env() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GRAPHYTE_TEST_PASSWORD", "s3cret");
        }
        let result = expand_env("${GRAPHYTE_TEST_PASSWORD}", "confluence.password").unwrap();
        assert_eq!(result, "s3cret");
        unsafe {
            std::env::remove_var("GRAPHYTE_TEST_PASSWORD");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GRAPHYTE_TEST_JAR");
        }
        let result = expand_env("${GRAPHYTE_TEST_JAR:-utils/plantuml.jar}", "tools.plantuml_jar")
            .unwrap();
        assert_eq!(result, "utils/plantuml.jar");
    }

    #[test]
    fn test_expand_embedded_in_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GRAPHYTE_TEST_HOME", "/opt/tools");
        }
        let result = expand_env("${GRAPHYTE_TEST_HOME}/bin/pyang", "tools.pyang").unwrap();
        assert_eq!(result, "/opt/tools/bin/pyang");
        unsafe {
            std::env::remove_var("GRAPHYTE_TEST_HOME");
        }
    }

    #[test]
    fn test_missing_var_reports_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GRAPHYTE_TEST_MISSING");
        }
        let err = expand_env("${GRAPHYTE_TEST_MISSING}", "confluence.username").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("GRAPHYTE_TEST_MISSING"));
        assert!(err.to_string().contains("confluence.username"));
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(expand_env("<$ifname>", "main.title").unwrap(), "<$ifname>");
    }

    #[test]
    fn test_expand_opt_none_stays_none() {
        let mut value = None;
        expand_opt(&mut value, "main.title").unwrap();
        assert!(value.is_none());
    }
}
