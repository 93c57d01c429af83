use crate::pipeline::{Outcome, Severity};

pub const EMPTY_INPUT_WARNING: &str = "Please enter a YouTube video link to get a summary.";

/// Render an outcome for the terminal: status line first, then summary or guidance
pub fn render_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::EmptyInput => format!("Warning: {EMPTY_INPUT_WARNING}"),
        Outcome::Success(report) => format!(
            "Transcript fetched successfully. Length: {} characters.\n\n---\n## Detailed Notes:\n\n{}",
            report.transcript_chars, report.summary
        ),
        Outcome::Failed { error, guidance } => format!(
            "Error: Could not process video or generate summary. {error}\n{}: {}",
            severity_label(guidance.severity()),
            guidance.message()
        ),
    }
}

/// Render an outcome as a single JSON object
pub fn render_json(outcome: &Outcome) -> String {
    let value = match outcome {
        Outcome::EmptyInput => serde_json::json!({
            "status": "empty_input",
            "warning": EMPTY_INPUT_WARNING,
        }),
        Outcome::Success(report) => serde_json::json!({
            "status": "success",
            "video_id": report.video_id.as_str(),
            "transcript_chars": report.transcript_chars,
            "cached": report.cached,
            "summary": report.summary,
        }),
        Outcome::Failed { error, guidance } => serde_json::json!({
            "status": "failed",
            "kind": error.kind(),
            "error": error.to_string(),
            "guidance": guidance.name(),
            "message": guidance.message(),
        }),
    };
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "Info",
        Severity::Warning => "Warning",
        Severity::Error => "Error",
    }
}
