//! Post-processing for classification-style model output.

use crate::catalog::JobCatalog;

/// Pulls a single job title out of a model's raw answer.
///
/// This is a best-effort heuristic, not exact matching. Lines are scanned in
/// order; on each line the first catalog title (in catalog order) that appears
/// as a case-insensitive substring is returned in its catalog spelling. If no
/// line mentions any title, the first non-blank line of the raw output is
/// returned trimmed. Titles that are substrings of longer titles can shadow them, and a
/// title mentioned in passing ("not a Web Developer") still counts as a match.
pub fn clean_output(raw: &str, catalog: &JobCatalog) -> String {
    let lowered_titles: Vec<(String, &str)> = catalog
        .titles()
        .iter()
        .map(|t| (t.title.to_lowercase(), t.title.as_str()))
        .collect();

    for line in raw.lines() {
        let line = line.to_lowercase();
        if let Some((_, title)) = lowered_titles
            .iter()
            .find(|(lowered, _)| !lowered.is_empty() && line.contains(lowered.as_str()))
        {
            return title.to_string();
        }
    }

    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
