//! Parameter AST definitions

use serde::{Deserialize, Serialize};

/// A pipeline parameter declared in a `parameters { }` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name (unique within the pipeline)
    pub name: String,

    /// Parameter kind
    #[serde(flatten)]
    pub kind: ParameterKind,

    /// Default value
    pub default: ParameterValue,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Supported parameter kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Boolean,
    Choice {
        /// Ordered options, the first one is the default
        options: Vec<String>,
    },
}

/// A parameter default value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Text(String),
}

impl ParameterSpec {
    /// A `string(...)` parameter
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::String,
            default: ParameterValue::Text(default.into()),
            description: None,
        }
    }

    /// A `booleanParam(...)` parameter
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Boolean,
            default: ParameterValue::Bool(default),
            description: None,
        }
    }

    /// A `choice(...)` parameter; its default is the first option, or an
    /// empty string when there are no options
    pub fn choice(name: impl Into<String>, options: Vec<String>) -> Self {
        let default = options.first().cloned().unwrap_or_default();
        Self {
            name: name.into(),
            kind: ParameterKind::Choice { options },
            default: ParameterValue::Text(default),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Kind keyword as used by workflow_dispatch inputs
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ParameterKind::String => "string",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Choice { .. } => "choice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_defaults_to_first_option() {
        let param = ParameterSpec::choice(
            "DEPLOY_ENV",
            vec!["dev".to_string(), "staging".to_string(), "prod".to_string()],
        );
        assert_eq!(param.default, ParameterValue::Text("dev".to_string()));
        assert_eq!(param.kind_name(), "choice");
    }

    #[test]
    fn test_choice_without_options() {
        let param = ParameterSpec::choice("EMPTY", Vec::new());
        assert_eq!(param.default, ParameterValue::Text(String::new()));
    }

    #[test]
    fn test_boolean_parameter() {
        let param = ParameterSpec::boolean("RUN_TESTS", true).with_description("Run the tests");
        assert_eq!(param.default, ParameterValue::Bool(true));
        assert_eq!(param.description.as_deref(), Some("Run the tests"));
        assert_eq!(param.kind_name(), "boolean");
    }
}
