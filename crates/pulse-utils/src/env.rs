//! Environment variable helpers

/// Read an environment variable, treating empty values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Return the first non-empty variable among `names`
pub fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env_var(name))
}

/// Interpret a variable as a boolean switch (`1`, `true`, `yes`, `on`)
pub fn env_flag(name: &str) -> bool {
    env_var(name).is_some_and(|v| {
        matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_helpers() {
        // SAFETY: test-only env mutation on variable names no other test touches
        unsafe {
            std::env::set_var("PULSE_UTILS_TEST_EMPTY", "  ");
            std::env::set_var("PULSE_UTILS_TEST_SET", "value");
            std::env::set_var("PULSE_UTILS_TEST_FLAG", "Yes");
        }

        assert_eq!(env_var("PULSE_UTILS_TEST_EMPTY"), None);
        assert_eq!(env_var("PULSE_UTILS_TEST_SET").as_deref(), Some("value"));
        assert_eq!(
            first_env_var(&["PULSE_UTILS_TEST_EMPTY", "PULSE_UTILS_TEST_SET"]).as_deref(),
            Some("value")
        );
        assert!(env_flag("PULSE_UTILS_TEST_FLAG"));
        assert!(!env_flag("PULSE_UTILS_TEST_MISSING"));
    }
}
