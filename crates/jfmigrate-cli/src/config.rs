//! Converter configuration loading

use jfmigrate_compiler::ConverterOptions;
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_NAME: &str = "jfmigrate";

/// Prefix of configuration environment variables (`JFMIGRATE_WORKFLOW_NAME`)
pub const ENV_PREFIX: &str = "JFMIGRATE";

/// Load converter options.
///
/// Sources, lowest precedence first:
/// - built-in defaults
/// - `path`, or an optional `jfmigrate.{yaml,toml,json}` in the working directory
/// - `JFMIGRATE_*` environment variables (after loading `.env`)
pub fn load_options(path: Option<&Path>) -> anyhow::Result<ConverterOptions> {
    // Load .env file if exists
    dotenvy::dotenv().ok();

    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("push_branches"),
        )
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let options: ConverterOptions = settings
        .try_deserialize()
        .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))?;

    tracing::debug!("Loaded converter options: {:?}", options);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jfmigrate.yaml");
        fs::write(
            &path,
            "workflow_name: Nightly\npush_branches:\n  - develop\nactions_dir: ci/actions\n",
        )
        .unwrap();

        let options = load_options(Some(&path)).unwrap();
        assert_eq!(options.workflow_name, "Nightly");
        assert_eq!(options.push_branches, vec!["develop"]);
        assert_eq!(options.actions_dir, "ci/actions");
        assert_eq!(options.checkout_action, "actions/checkout@v4");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_options(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
