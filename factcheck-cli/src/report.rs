//! Verdict report formatting.

use std::fmt::Write as _;

use factcheck_verify::Verdict;

const TOP_EVIDENCE_CHARS: usize = 200;
const EXTRA_EVIDENCE_CHARS: usize = 150;

/// The first `max` characters of `text`, with `...` appended when cut.
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Render a human-readable report, one block per verdict.
pub fn render_text(verdicts: &[Verdict]) -> String {
    let mut out = String::new();
    let rule = "==========================================";
    let _ = writeln!(out, "{rule}\n          Fact-Checking Report\n{rule}");

    for verdict in verdicts {
        let _ = writeln!(out, "\n[Sentence] {}", verdict.claim);
        let _ = writeln!(out, "  - Score: {}/100", verdict.score);
        let _ = writeln!(out, "  - Decision: {}", verdict.decision);
        let _ = writeln!(out, "  - Reason: {}", verdict.reason);

        let Some((top, rest)) = verdict.evidence.split_first() else {
            continue;
        };
        let _ = writeln!(
            out,
            "  - Similarity Score: {:.3} (cosine similarity between sentence and top evidence)",
            verdict.similarity()
        );
        let _ = writeln!(out, "  - Top Evidence Source: {}", top.source);
        let top_text = preview(&top.text, TOP_EVIDENCE_CHARS);
        let _ = writeln!(out, "  - Top Evidence Text: \"{top_text}\"");

        if !rest.is_empty() {
            let _ = writeln!(out, "  - Additional Evidence Sources ({} more):", rest.len());
            for (i, item) in rest.iter().enumerate() {
                let _ = writeln!(out, "    {}. {}", i + 2, item.source);
                let _ = writeln!(out, "       \"{}\"", preview(&item.text, EXTRA_EVIDENCE_CHARS));
            }
        }
    }
    out
}

/// Render verdicts as a pretty-printed JSON array.
pub fn render_json(verdicts: &[Verdict]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(verdicts)
}
