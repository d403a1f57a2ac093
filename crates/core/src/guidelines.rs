//! Annotation guideline text.

/// Shown when the guideline file cannot be read.
pub const MISSING_GUIDELINES: &str = "Guidelines file not found.";

/// Normalize guideline markdown for display: literal `<br>` tags become
/// newlines.
pub fn normalize(raw: &str) -> String {
    raw.replace("<br>", "\n")
}
