//! Job identifiers
//!
//! Job ids are lower-kebab slugs of stage names. The slug namespace is local
//! to one compilation pass; collisions are resolved with `-2`, `-3`, ...

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("Valid slug regex"));

static NON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("Valid name regex"));

/// Lower-kebab slug of a stage name; `job` when nothing is left
pub fn slugify(name: &str) -> String {
    let slug = NON_ALPHANUMERIC
        .replace_all(name, "-")
        .trim_matches('-')
        .to_lowercase();
    if slug.is_empty() {
        "job".to_string()
    } else {
        slug
    }
}

/// Stage name made safe for artifact names
pub fn sanitize_name(name: &str) -> String {
    NON_NAME.replace_all(name, "_").into_owned()
}

/// Registry of the job ids taken so far
#[derive(Debug, Default)]
pub struct SlugRegistry {
    taken: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique id derived from `base`.
    ///
    /// Returns the id and whether `base` itself was already taken.
    pub fn register(&mut self, base: &str) -> (String, bool) {
        if self.taken.insert(base.to_string()) {
            return (base.to_string(), false);
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if self.taken.insert(candidate.clone()) {
                return (candidate, true);
            }
            suffix += 1;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }
}
