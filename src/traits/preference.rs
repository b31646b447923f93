/// A source of the reduced-motion accessibility preference
pub trait MotionPreference {
    /// `Some(true)` when the source asks for reduced motion, `None` when it has no opinion
    fn prefers_reduced_motion(&self) -> Option<bool>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Fixed answer, e.g. from a CLI flag or config file
#[derive(Debug, Clone, Copy)]
pub struct FixedPreference {
    pub name: &'static str,
    pub value: Option<bool>,
}

impl MotionPreference for FixedPreference {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.value
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Reads an environment variable: `1`/`true`/`reduce` → reduced, `0`/`false`/`no-preference` → full motion
#[derive(Debug, Clone)]
pub struct EnvPreference {
    var: String,
}

impl EnvPreference {
    pub const DEFAULT_VAR: &'static str = "SHOWCASE_REDUCED_MOTION";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn parse(value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "reduce" => Some(true),
            "0" | "false" | "no" | "no-preference" => Some(false),
            _ => None,
        }
    }
}

impl Default for EnvPreference {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl MotionPreference for EnvPreference {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        std::env::var(&self.var).ok().and_then(|v| Self::parse(&v))
    }

    fn name(&self) -> &str {
        &self.var
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_values() {
        assert_eq!(EnvPreference::parse("1"), Some(true));
        assert_eq!(EnvPreference::parse(" Reduce "), Some(true));
        assert_eq!(EnvPreference::parse("no-preference"), Some(false));
        assert_eq!(EnvPreference::parse("maybe"), None);
    }

    #[test]
    fn test_fixed_preference() {
        let pref = FixedPreference {
            name: "cli",
            value: Some(true),
        };
        assert_eq!(pref.prefers_reduced_motion(), Some(true));
        assert_eq!(pref.name(), "cli");
    }
}
