//! Plain-text export of a quiz with its answer key.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::models::{AnswerSelections, QuestionSet};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

pub const EXPORT_FILE_NAME: &str = "results.txt";

/// Option letter for a zero-based index: A, B, C, ...
pub fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| (b'A' + i) as char)
        .unwrap_or('?')
}

/// The summary arrives as rendered markdown; drop tags and decode the common entities.
pub fn strip_html(html: &str) -> String {
    let text = TAG.replace_all(html, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}

/// Summary followed by every question, its options, the key and the explanation.
/// When `selections` is given, each question also shows the chosen option.
pub fn to_text(set: &QuestionSet, selections: Option<&AnswerSelections>) -> String {
    let mut out = String::new();

    out.push_str("Summary\n");
    out.push_str(&strip_html(set.summary()));
    out.push_str("\n\nMultiple Choice Questions\n");

    for (number, question) in set.questions().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", number + 1, question.question));
        for (index, option) in question.options.iter().enumerate() {
            out.push_str(&format!("   {}. {}\n", option_label(index), option));
        }

        if let Some(chosen) = selections.and_then(|s| s.get(question.id)) {
            let text = question.options.get(chosen).map(String::as_str).unwrap_or("");
            out.push_str(&format!("Your Answer: {}. {}\n", option_label(chosen), text));
        }

        out.push_str(&format!(
            "Correct Answer: {}. {}\n",
            option_label(question.correct_answer),
            question.correct_option().unwrap_or("")
        ));
        out.push_str(&format!("Explanation: {}\n\n", question.explanation));
    }

    out
}

/// Write the export into `dir`, returning the file path.
pub fn write_text(dir: &Path, set: &QuestionSet, selections: Option<&AnswerSelections>) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, to_text(set, selections))?;
    info!(path = %path.display(), questions = set.len(), "exported quiz");
    Ok(path)
}
