//! Environment maps
//!
//! Environment variables keep their declaration order so the generated
//! documents list them the way the Jenkinsfile does.

use indexmap::IndexMap;

/// Ordered mapping of variable name to raw value
pub type EnvironmentMap = IndexMap<String, String>;

/// Keep only the entries of `scoped` that are absent from `global` or carry
/// a different value there.
pub fn diff_environment(scoped: &EnvironmentMap, global: &EnvironmentMap) -> EnvironmentMap {
    scoped
        .iter()
        .filter(|(key, value)| global.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Entries of `base` followed by those of `over`; keys present in both take
/// the value from `over` but keep their position from `base`.
pub fn overlay_environment(base: &EnvironmentMap, over: &EnvironmentMap) -> EnvironmentMap {
    let mut merged = base.clone();
    for (key, value) in over {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvironmentMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_diff_drops_identical_pairs() {
        let global = env(&[("APP", "demo"), ("REGION", "eu")]);
        let scoped = env(&[("APP", "demo"), ("REGION", "us"), ("EXTRA", "1")]);

        let diff = diff_environment(&scoped, &global);
        assert_eq!(diff, env(&[("REGION", "us"), ("EXTRA", "1")]));
    }

    #[test]
    fn test_diff_against_empty_global() {
        let scoped = env(&[("A", "1")]);
        assert_eq!(diff_environment(&scoped, &EnvironmentMap::new()), scoped);
    }

    #[test]
    fn test_overlay_keeps_base_order() {
        let base = env(&[("A", "1"), ("B", "2")]);
        let over = env(&[("B", "3"), ("C", "4")]);

        let merged = overlay_environment(&base, &over);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(merged["B"], "3");
    }
}
