//! Per-hunk prompt construction.

use crate::models::diff::Hunk;
use crate::models::review::PrDetails;
use crate::models::Prompt;

/// Review policy given to the model as the first system message.
pub const REVIEW_RULES: &str = "\
Your task is to review pull requests. Instructions:
- Do not give positive comments or compliments.
- Provide comments and suggestions ONLY if there is something to improve.
- Write the comment in GitHub Markdown format.
- Use the given description only for the overall context and only comment the code.
- Do not suggest code style or formatting changes.
- IMPORTANT: NEVER suggest adding comments to the code.
- Flag a code smell only when the diff shows concrete evidence of it.";

/// Reply shape required of the model, sent as the second system message.
pub const OUTPUT_FORMAT: &str = "\
Respond with ONLY a JSON array and no other text, in this format:
[{\"lineNumber\": <line_number>, \"reviewComment\": \"<review comment>\"}]
`lineNumber` is the number shown at the start of the diff line you comment on.
If there is nothing to improve, respond with an empty array: []";

/// Build the three-part prompt for one hunk of `file_path`.
pub fn build_prompt(file_path: &str, details: &PrDetails, hunk: &Hunk) -> Prompt {
    let mut user = String::new();
    user.push_str(&format!(
        "Review the following code diff in the file \"{file_path}\" and take the pull \
         request title and description into account when writing the response.\n\n"
    ));
    user.push_str(&format!("Pull request title: {}\n", details.title));
    user.push_str("Pull request description:\n\n---\n");
    user.push_str(&details.description);
    user.push_str("\n---\n\n");
    user.push_str("Git diff to review:\n\n```diff\n");
    user.push_str(&numbered_hunk(hunk));
    user.push_str("```\n");

    Prompt {
        system: REVIEW_RULES.to_string(),
        output_format: OUTPUT_FORMAT.to_string(),
        user,
    }
}

/// The hunk header followed by each change line as `<line> <marker><content>`.
fn numbered_hunk(hunk: &Hunk) -> String {
    let mut out = String::new();
    out.push_str(&hunk.raw_header);
    out.push('\n');
    for line in &hunk.lines {
        out.push_str(&format!(
            "{} {}{}\n",
            line.line_number(),
            line.line_type.marker(),
            line.content
        ));
    }
    out
}
