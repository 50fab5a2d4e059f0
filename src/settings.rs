use crate::request::{BodyPrintLimit, BODY_PRINT_LIMIT};
use once_cell::sync::Lazy;
use std::env;

/// Set to any value other than an empty string, `0` or `false` to turn [`activate`] and
/// [`deactivate`] into no-ops for the whole process.
///
/// [`activate`]: crate::activate
/// [`deactivate`]: crate::deactivate
pub const DISABLED_ENV: &str = "TRIPMOCK_DISABLED";

/// Maximum number of body bytes printed when a request is logged.
pub const BODY_PRINT_LIMIT_ENV: &str = "TRIPMOCK_BODY_PRINT_LIMIT";

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

/// Process-level configuration.
///
/// The process-wide [`ActivationController`] reads it from the environment the first time it is
/// used - see [`Settings::global`]. Isolated controllers can be given their own.
///
/// [`ActivationController`]: crate::ActivationController
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    disabled: bool,
    body_print_limit: BodyPrintLimit,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            disabled: false,
            body_print_limit: BodyPrintLimit::Limited(BODY_PRINT_LIMIT),
        }
    }
}

impl Settings {
    /// The settings shared by the whole process, read from the environment once.
    pub fn global() -> &'static Settings {
        &SETTINGS
    }

    pub fn from_env() -> Self {
        let disabled = parse_flag(env::var(DISABLED_ENV).ok().as_deref());
        let body_print_limit = match env::var(BODY_PRINT_LIMIT_ENV)
            .ok()
            .and_then(|x| x.parse::<usize>().ok())
        {
            Some(limit) => BodyPrintLimit::Limited(limit),
            None => BodyPrintLimit::Limited(BODY_PRINT_LIMIT),
        };
        Self {
            disabled,
            body_print_limit,
        }
    }

    /// Turn activation and deactivation into no-ops.
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_body_print_limit(mut self, limit: BodyPrintLimit) -> Self {
        self.body_print_limit = limit;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn body_print_limit(&self) -> BodyPrintLimit {
        self.body_print_limit
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_falsy_values_keep_mocking_enabled() {
        assert!(!parse_flag(None));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("FALSE")));
        assert!(!parse_flag(Some(" false ")));
    }

    #[test]
    fn any_other_value_disables_mocking() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("yes")));
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();

        assert!(!settings.is_disabled());
        assert_eq!(
            settings.body_print_limit(),
            BodyPrintLimit::Limited(BODY_PRINT_LIMIT)
        );
        assert!(settings.disable().is_disabled());
    }
}
