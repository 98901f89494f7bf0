// src/exec/env.rs

//! Environment handed to the engine process.

use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{API_KEY_NAME, DEFAULT_LOCALE};

pub const MODULE_PATH_VAR: &str = "PYTHONPATH";
pub const LOCALE_VARS: [&str; 2] = ["LC_ALL", "LANG"];

/// Snapshot of this process's environment, skipping non-UTF-8 entries.
pub fn inherited_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Apply the engine overrides on top of `base`:
/// - the API key, when one is available;
/// - `engine_root` on the module search path, unless already listed;
/// - a UTF-8 locale for any locale variable that is unset.
pub fn engine_environment(
    base: &BTreeMap<String, String>,
    engine_root: &Path,
    api_key: Option<&str>,
) -> BTreeMap<String, String> {
    let mut env = base.clone();

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        env.insert(API_KEY_NAME.to_string(), key.to_string());
    }

    let root = engine_root.to_string_lossy().into_owned();
    let current = env.get(MODULE_PATH_VAR).cloned().unwrap_or_default();
    if !current.split(':').any(|entry| entry == root) {
        let extended = if current.is_empty() {
            root
        } else {
            format!("{root}:{current}")
        };
        env.insert(MODULE_PATH_VAR.to_string(), extended);
    }

    for var in LOCALE_VARS {
        env.entry(var.to_string())
            .or_insert_with(|| DEFAULT_LOCALE.to_string());
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn module_path_prepended_once() {
        let root = Path::new("/opt/appstories");

        let env = engine_environment(&base(&[]), root, None);
        assert_eq!(env[MODULE_PATH_VAR], "/opt/appstories");

        let env = engine_environment(&base(&[(MODULE_PATH_VAR, "/usr/lib/py")]), root, None);
        assert_eq!(env[MODULE_PATH_VAR], "/opt/appstories:/usr/lib/py");

        let already = base(&[(MODULE_PATH_VAR, "/x:/opt/appstories")]);
        let env = engine_environment(&already, root, None);
        assert_eq!(env[MODULE_PATH_VAR], "/x:/opt/appstories");
    }

    #[test]
    fn locale_defaults_do_not_override() {
        let env = engine_environment(&base(&[("LANG", "ru_RU.UTF-8")]), Path::new("/r"), None);
        assert_eq!(env["LANG"], "ru_RU.UTF-8");
        assert_eq!(env["LC_ALL"], DEFAULT_LOCALE);
    }

    #[test]
    fn api_key_only_when_present() {
        let env = engine_environment(&base(&[]), Path::new("/r"), Some(""));
        assert!(!env.contains_key(API_KEY_NAME));

        let env = engine_environment(&base(&[]), Path::new("/r"), Some("sk-1"));
        assert_eq!(env[API_KEY_NAME], "sk-1");
    }

    #[test]
    fn inherited_keys_survive() {
        let env = engine_environment(&base(&[("PATH", "/bin")]), Path::new("/r"), None);
        assert_eq!(env["PATH"], "/bin");
    }
}
