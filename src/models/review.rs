//! Review types: pull request details, model replies, and review comments.

use serde::{Deserialize, Serialize};

/// Pull request metadata used to give the model context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrDetails {
    pub owner: String,
    pub repo: String,
    pub pull_number: u64,
    pub title: String,
    /// The PR body; empty when the author left it blank.
    pub description: String,
}

/// A single entry of the model's reply for one hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReview {
    /// Line in the new version of the file the comment refers to.
    #[serde(rename = "lineNumber", deserialize_with = "deserialize_line_number")]
    pub line_number: u32,
    /// Markdown body of the comment.
    #[serde(rename = "reviewComment")]
    pub review_comment: String,
}

/// Accept a line number given either as a JSON number or as a numeric string.
///
/// Models regularly quote numbers (`"lineNumber": "42"`), which would
/// otherwise fail the whole hunk.
fn deserialize_line_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("lineNumber is not a line number: {s:?}"))
        }),
    }
}

/// An inline review comment bound to a file and line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub path: String,
    pub line: u32,
    pub body: String,
}

impl ReviewComment {
    /// Bind a model reply entry to the reviewed file.
    pub fn from_model(path: &str, review: ModelReview) -> Self {
        Self {
            path: path.to_string(),
            line: review.line_number,
            body: review.review_comment,
        }
    }
}

/// Payload of the create-review call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReview {
    pub event: &'static str,
    pub comments: Vec<ReviewComment>,
}

impl CreateReview {
    /// A plain `COMMENT` review carrying every comment.
    pub fn comment(comments: Vec<ReviewComment>) -> Self {
        Self {
            event: "COMMENT",
            comments,
        }
    }
}
