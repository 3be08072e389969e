//! Post block parser

use crate::commands::extract_commands;
use crate::scanner::{find_top_level_block, mask_nested, match_brace};
use jfmigrate_core::{Diagnostic, DiagnosticCode, Extracted, PostAction, PostBlock, PostCondition};
use once_cell::sync::Lazy;
use regex::Regex;

static CONDITION_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_]\w*)\s*\{").expect("Valid condition regex"));

static ARCHIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\barchiveArtifacts\s*\(?\s*(?:artifacts\s*:\s*)?['"]([^'"]+)['"]"#)
        .expect("Valid archive regex")
});

static MAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:mail|emailext)\b").expect("Valid mail regex"));

static MAIL_TO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bto\s*:\s*['"]([^'"]+)['"]"#).expect("Valid mail regex"));

/// Post block parser
pub(crate) struct PostParser;

impl PostParser {
    /// Parse the top-level `post { }` block of a pipeline or stage body.
    ///
    /// Returns `None` when there is no post block or it holds no action.
    pub(crate) fn parse(body: &str, element: &str) -> Extracted<Option<PostBlock>> {
        let Some(span) = find_top_level_block(body, "post") else {
            return Extracted::new(None);
        };
        Self::parse_conditions(span.slice(body), element).map(|block| {
            if block.is_empty() {
                None
            } else {
                Some(block)
            }
        })
    }

    /// Parse the condition blocks of a post body
    pub(crate) fn parse_conditions(post: &str, element: &str) -> Extracted<PostBlock> {
        let mut result = Extracted::new(PostBlock::new());
        let top_level = mask_nested(post);

        for caps in CONDITION_BLOCK.captures_iter(&top_level) {
            let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let open = whole.end() - 1;
            let Some(close) = match_brace(post, open) else {
                continue;
            };
            let inner = &post[open + 1..close];

            let condition = PostCondition::ALL
                .into_iter()
                .find(|condition| condition.keyword() == keyword.as_str());

            match condition {
                Some(condition) => result.value.insert(condition, Self::parse_action(inner)),
                None => result.push(Diagnostic::new(
                    DiagnosticCode::UnsupportedPostCondition,
                    element,
                    format!("post condition '{}' is not translated", keyword.as_str()),
                )),
            }
        }

        result
    }

    fn parse_action(inner: &str) -> PostAction {
        let archive = ARCHIVE
            .captures(inner)
            .map(|caps| caps[1].trim().to_string());

        let notify = if MAIL.is_match(inner) {
            MAIL_TO
                .captures(inner)
                .map(|caps| caps[1].trim().to_string())
        } else {
            None
        };

        PostAction {
            archive,
            commands: extract_commands(inner),
            notify,
        }
    }
}
