//! Secret reference resolver.
//!
//! The `password` in `config.toml` can reference a secret stored outside
//! the file:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is the password itself

/// Prefix of a password-store reference.
const PASS_PREFIX: &str = "pass::";
/// Prefix of an environment variable reference.
const ENV_PREFIX: &str = "env::";

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix(PASS_PREFIX) {
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix(ENV_PREFIX) {
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

/// Returns true if `value` points at a secret instead of holding it.
pub fn is_reference(value: &str) -> bool {
    value.starts_with(PASS_PREFIX) || value.starts_with(ENV_PREFIX)
}

/// Returns `value` safe to print: references as-is, plain secrets masked.
pub fn display_value(value: &str) -> String {
    if is_reference(value) {
        value.to_string()
    } else {
        "********".to_string()
    }
}

fn resolve_pass(path: &str) -> Result<String, String> {
    if path.is_empty() {
        return Err("empty `pass::` reference".to_string());
    }

    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .filter(|line| !line.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hunter2").unwrap(), "hunter2");
        assert_eq!(resolve("").unwrap(), "");
        assert!(!is_reference("hunter2"));
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_TIMETREE_TEST_PASSWORD", "from-env");
        }
        assert_eq!(resolve("env::_TIMETREE_TEST_PASSWORD").unwrap(), "from-env");
        unsafe {
            std::env::remove_var("_TIMETREE_TEST_PASSWORD");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_TIMETREE_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn pass_prefix_errors() {
        assert!(resolve("pass::").is_err());
        // Fails whether or not `pass` is installed
        assert!(resolve("pass::nonexistent/entry/that/should/not/exist/12345").is_err());
    }

    #[test]
    fn display_masks_plain_secrets() {
        assert_eq!(display_value("hunter2"), "********");
        assert_eq!(display_value("env::TT_PASSWORD"), "env::TT_PASSWORD");
        assert_eq!(display_value("pass::web/timetree"), "pass::web/timetree");
    }
}
