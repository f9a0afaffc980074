use regex::Regex;

use crate::error::Result;

/// Display name used by callers when cleaning leaves nothing.
pub const UNKNOWN_ANIME: &str = "Unknown Anime";

/// Whole-word replacements, matched case-insensitively.
const REPLACEMENTS: [(&str, &str); 4] = [
    ("Tamil", "Tam"),
    ("English", "Eng"),
    ("Dubbed", "Dub"),
    ("Subbed", "Sub"),
];

/// Strips channel handles, bracket spans and punctuation from a raw title.
pub struct NameCleaner {
    re_handle: Regex,
    re_brackets: Regex,
    re_parens: Regex,
    re_leading_dash: Regex,
    re_trailing_dash: Regex,
    replacements: Vec<(Regex, &'static str)>,
    re_punctuation: Regex,
    re_whitespace: Regex,
}

impl NameCleaner {
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        let replacements = REPLACEMENTS
            .into_iter()
            .map(|(word, short)| Ok((Regex::new(&format!(r"(?i)\b{word}\b"))?, short)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            re_handle: Regex::new(r"(?i)^@\w+\s*-\s*")?,
            re_brackets: Regex::new(r"\[.*?\]")?,
            re_parens: Regex::new(r"\(.*?\)")?,
            re_leading_dash: Regex::new(r"^\s*-\s*")?,
            re_trailing_dash: Regex::new(r"\s*-\s*$")?,
            replacements,
            re_punctuation: Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#)?,
            re_whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Produces a display name. Empty input yields an empty string.
    #[must_use]
    pub fn clean(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }

        let mut work = self.re_handle.replace(name, "").into_owned();
        // Brackets go first; a paren span cut by them is left to the punctuation pass.
        work = self.re_brackets.replace_all(&work, "").into_owned();
        work = self.re_parens.replace_all(&work, "").into_owned();
        work = self.re_leading_dash.replace(&work, "").into_owned();
        work = self.re_trailing_dash.replace(&work, "").into_owned();

        for (re, short) in &self.replacements {
            work = re.replace_all(&work, *short).into_owned();
        }

        work = self.re_punctuation.replace_all(&work, "").into_owned();
        self.re_whitespace
            .replace_all(&work, " ")
            .trim()
            .to_string()
    }
}
