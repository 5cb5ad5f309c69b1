//! Prompt rendering for label suggestion
//!
//! The template uses `{{VARIABLE}}` placeholders filled in a single pass, so
//! issue text that happens to contain a placeholder is never re-expanded.

use serde::{Deserialize, Serialize};

use super::LabelVocabulary;

const LABEL_ISSUE_PROMPT: &str = include_str!("prompts/label_issue.md");

/// Stand-in for a missing or empty issue body
pub const NO_DESCRIPTION: &str = "No description provided";

/// Stand-in for an issue without comments
pub const NO_COMMENTS: &str = "No comments";

/// A single issue comment as shown to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentText {
    pub author: String,
    pub body: String,
}

/// The parts of an issue the model gets to read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueText {
    pub title: String,
    pub body: Option<String>,
    pub comments: Vec<CommentText>,
}

impl IssueText {
    /// Body text, or the placeholder when absent or empty
    pub fn body_or_placeholder(&self) -> &str {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => body,
            _ => NO_DESCRIPTION,
        }
    }

    /// Comments as `- author: body` lines, or the placeholder when there are none
    pub fn comments_block(&self) -> String {
        if self.comments.is_empty() {
            return NO_COMMENTS.to_string();
        }

        self.comments
            .iter()
            .map(|c| format!("- {}: {}", c.author, c.body))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render the labelling prompt for one issue
pub fn render_prompt(issue: &IssueText, vocabulary: &LabelVocabulary) -> String {
    let labels = vocabulary.joined();
    let comments = issue.comments_block();

    render(LABEL_ISSUE_PROMPT, |name| match name {
        "AVAILABLE_LABELS" => Some(labels.as_str()),
        "ISSUE_TITLE" => Some(issue.title.as_str()),
        "ISSUE_BODY" => Some(issue.body_or_placeholder()),
        "COMMENTS" => Some(comments.as_str()),
        _ => None,
    })
}

/// Replace `{{NAME}}` placeholders; unknown names are left untouched
fn render<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> LabelVocabulary {
        ["bug", "enhancement"].into_iter().collect()
    }

    #[test]
    fn test_placeholders_for_bare_issue() {
        let issue = IssueText {
            title: "Crash on start".to_string(),
            body: None,
            comments: vec![],
        };

        let prompt = render_prompt(&issue, &vocab());
        assert!(prompt.contains("Available Labels: bug, enhancement"));
        assert!(prompt.contains("Title: Crash on start"));
        assert!(prompt.contains("Body: No description provided"));
        assert!(prompt.contains("Comments:\nNo comments"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_empty_body_uses_placeholder() {
        let issue = IssueText {
            title: "t".to_string(),
            body: Some(String::new()),
            comments: vec![],
        };
        assert_eq!(issue.body_or_placeholder(), NO_DESCRIPTION);
    }

    #[test]
    fn test_comments_flattened() {
        let issue = IssueText {
            title: "t".to_string(),
            body: Some("b".to_string()),
            comments: vec![
                CommentText {
                    author: "alice".to_string(),
                    body: "same here".to_string(),
                },
                CommentText {
                    author: "bob".to_string(),
                    body: "fixed in main".to_string(),
                },
            ],
        };

        assert_eq!(
            issue.comments_block(),
            "- alice: same here\n- bob: fixed in main"
        );
    }

    #[test]
    fn test_issue_text_is_not_re_expanded() {
        let issue = IssueText {
            title: "{{COMMENTS}}".to_string(),
            body: Some("{{AVAILABLE_LABELS}}".to_string()),
            comments: vec![],
        };

        let prompt = render_prompt(&issue, &vocab());
        assert!(prompt.contains("Title: {{COMMENTS}}"));
        assert!(prompt.contains("Body: {{AVAILABLE_LABELS}}"));
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed() {
        let out = render("a {{X}} b {{Y", |n| (n == "Z").then_some("z"));
        assert_eq!(out, "a {{X}} b {{Y");
    }
}
