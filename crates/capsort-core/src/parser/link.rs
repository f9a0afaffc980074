//! # Link filename parsing
//!
//! Stored bulk entries are looked up by the metadata embedded in their
//! download links. This module decodes a link's final path segment and pulls
//! season, episode, quality, language and packaging out of it, then filters
//! a set of links against an optional `season / quality / episode` query.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::FileType;

/// Whole-word language tokens and the full names they map to.
const LINK_LANGUAGES: [(&str, &str); 12] = [
    ("tam", "Tamil"),
    ("tamil", "Tamil"),
    ("tel", "Telugu"),
    ("telugu", "Telugu"),
    ("hin", "Hindi"),
    ("hindi", "Hindi"),
    ("eng", "English"),
    ("english", "English"),
    ("mal", "Malayalam"),
    ("malayalam", "Malayalam"),
    ("kan", "Kannada"),
    ("kannada", "Kannada"),
];

/// Metadata recovered from a link or bare filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Always `"<digits>p"`.
    pub quality: Option<String>,
    pub title: Option<String>,
    /// Full language name, e.g. `"Tamil"`.
    pub language: Option<String>,
    pub format_type: Option<FileType>,
    /// Text after the last dot, without the dot.
    pub extension: Option<String>,
}

/// Optional query applied to stored links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub season: Option<u32>,
    /// Digits with or without a trailing `p`.
    pub quality: Option<String>,
    pub episode: Option<u32>,
}

impl SearchFilter {
    /// Returns `true` if the link satisfies every field that is set.
    ///
    /// Quality only rejects links that carry a quality of their own.
    #[must_use]
    pub fn matches(&self, info: &LinkInfo) -> bool {
        if self.season.is_some_and(|s| info.season != Some(s)) {
            return false;
        }
        if self.episode.is_some_and(|e| info.episode != Some(e)) {
            return false;
        }
        if let (Some(wanted), Some(actual)) = (&self.quality, &info.quality) {
            let wanted = wanted.trim().trim_end_matches(['p', 'P']).to_lowercase();
            if actual.to_lowercase() != format!("{wanted}p") {
                return false;
            }
        }
        true
    }
}

/// Parses link filenames into [`LinkInfo`].
pub struct LinkParser {
    re_season_episode: [Regex; 4],
    re_quality: [Regex; 3],
    re_language: Regex,
    re_format: [Regex; 2],
    title_strip: [Regex; 5],
    re_separators: Regex,
    re_whitespace: Regex,
    re_edges: Regex,
}

impl LinkParser {
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_season_episode: [
                Regex::new(r"(?i)S(\d+)-E(\d+)")?,
                Regex::new(r"(?i)S(\d+)E(\d+)")?,
                Regex::new(r"(?i)Season\s*(\d+)\s*Episode\s*(\d+)")?,
                Regex::new(r"(?i)(\d+)x(\d+)")?,
            ],
            re_quality: [
                Regex::new(r"(?i)\[(\d+p?)\]")?,
                Regex::new(r"(?i)(\d{3,4}p)")?,
                Regex::new(r"(\d{3,4})")?,
            ],
            re_language: Regex::new(
                r"(?i)\b(Tam|Tamil|Tel|Telugu|Hin|Hindi|Eng|English|Mal|Malayalam|Kan|Kannada)\b",
            )?,
            re_format: [
                Regex::new(r"(?i)\[(Single|Dual|Multi)\]")?,
                Regex::new(r"(?i)\b(Single|Dual|Multi)\b")?,
            ],
            title_strip: [
                Regex::new(r"(?i)\[\d+p?\]")?,
                Regex::new(r"(?i)\[S\d+-E\d+\]")?,
                Regex::new(r"(?i)S\d+E\d+")?,
                Regex::new(
                    r"(?i)\[(?:Single|Dual|Multi|Tam|Tamil|Tel|Telugu|Hin|Hindi|Eng|English)\]",
                )?,
                Regex::new(r"\.\w+$")?,
            ],
            re_separators: Regex::new(r"[_\-.]+")?,
            re_whitespace: Regex::new(r"\s+")?,
            re_edges: Regex::new(r"^[\[\]\-_\s]+|[\[\]\-_\s]+$")?,
        })
    }

    /// Reduces a link to its decoded final path segment, query string dropped.
    /// Non-link input is returned unchanged.
    #[must_use]
    pub fn filename(url_or_filename: &str) -> String {
        if !url_or_filename.starts_with("http") {
            return url_or_filename.to_string();
        }
        let decoded = urlencoding::decode(url_or_filename)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| url_or_filename.to_string());
        let last = decoded.rsplit('/').next().unwrap_or_default();
        last.split('?').next().unwrap_or_default().to_string()
    }

    /// Parses a link or filename. Every field is optional.
    #[must_use]
    pub fn parse(&self, url_or_filename: &str) -> LinkInfo {
        let filename = Self::filename(url_or_filename);

        let extension = filename
            .contains('.')
            .then(|| filename.rsplit('.').next().unwrap_or_default().to_string());

        let (season, episode) = self
            .re_season_episode
            .iter()
            .find_map(|re| re.captures(&filename))
            .map_or((None, None), |c| (c[1].parse().ok(), c[2].parse().ok()));

        LinkInfo {
            season,
            episode,
            quality: self.quality(&filename),
            title: self.title(&filename),
            language: self.language(&filename),
            format_type: self
                .re_format
                .iter()
                .find_map(|re| re.captures(&filename))
                .and_then(|c| FileType::from_label(&c[1])),
            extension,
        }
    }

    /// Keeps the links matching `filter`, ordered by episode (unknown first).
    pub fn search<'a, I>(&self, links: I, filter: &SearchFilter) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut hits: Vec<(u32, &'a str)> = links
            .into_iter()
            .filter_map(|link| {
                let info = self.parse(link);
                filter
                    .matches(&info)
                    .then(|| (info.episode.unwrap_or(0), link))
            })
            .collect();
        hits.sort_by_key(|&(episode, _)| episode);
        hits.into_iter().map(|(_, link)| link).collect()
    }

    fn quality(&self, filename: &str) -> Option<String> {
        self.re_quality.iter().find_map(|re| {
            re.captures_iter(filename).find_map(|c| {
                let digits: String = c[1].chars().filter(char::is_ascii_digit).collect();
                (digits.len() >= 3).then(|| format!("{digits}p"))
            })
        })
    }

    fn language(&self, filename: &str) -> Option<String> {
        let token = self.re_language.captures(filename)?[1].to_lowercase();
        LINK_LANGUAGES
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, name)| (*name).to_string())
    }

    fn title(&self, filename: &str) -> Option<String> {
        let mut work = filename.to_string();
        for re in &self.title_strip {
            work = re.replace_all(&work, "").into_owned();
        }
        work = self.re_separators.replace_all(&work, " ").into_owned();
        work = self.re_whitespace.replace_all(&work, " ").trim().to_string();
        work = self.re_edges.replace_all(&work, "").into_owned();

        (!work.is_empty()).then_some(work)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LinkParser {
        LinkParser::new().unwrap()
    }

    #[test]
    fn filename_from_encoded_link() {
        assert_eq!(
            LinkParser::filename("https://cdn.x/files/%5BS01-E03%5D%20Naruto.mkv?dl=1"),
            "[S01-E03] Naruto.mkv"
        );
        assert_eq!(LinkParser::filename("plain name.mkv"), "plain name.mkv");
    }

    #[test]
    fn canonical_link() {
        let p = parser();
        let info = p.parse("https://cdn.x/%5BS01-E03%5D%20Naruto%20Tam%20%5B480p%5D%20%5BSingle%5D.mkv");
        assert_eq!(info.season, Some(1));
        assert_eq!(info.episode, Some(3));
        assert_eq!(info.quality.as_deref(), Some("480p"));
        assert_eq!(info.language.as_deref(), Some("Tamil"));
        assert_eq!(info.format_type, Some(FileType::Single));
        assert_eq!(info.extension.as_deref(), Some("mkv"));
        assert_eq!(info.title.as_deref(), Some("Naruto Tam"));
    }

    #[test]
    fn alternative_numbering() {
        let p = parser();
        let info = p.parse("Bleach.Season 2 Episode 14.720p.mp4");
        assert_eq!((info.season, info.episode), (Some(2), Some(14)));
        assert_eq!(info.quality.as_deref(), Some("720p"));

        let info = p.parse("show_3x07.avi");
        assert_eq!((info.season, info.episode), (Some(3), Some(7)));
    }

    #[test]
    fn missing_fields_stay_none() {
        let p = parser();
        let info = p.parse("readme");
        assert_eq!(info.season, None);
        assert_eq!(info.quality, None);
        assert_eq!(info.extension, None);
        assert_eq!(info.title.as_deref(), Some("readme"));
    }

    #[test]
    fn filter_matching() {
        let p = parser();
        let info = p.parse("[S01-E11] Show [480p].mkv");

        let filter = SearchFilter {
            season: Some(1),
            quality: Some("480".into()),
            episode: Some(11),
        };
        assert!(filter.matches(&info));

        let filter = SearchFilter {
            quality: Some("720p".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&info));

        let filter = SearchFilter {
            season: Some(2),
            ..Default::default()
        };
        assert!(!filter.matches(&info));

        // Links without a quality are not rejected on quality.
        let bare = p.parse("[S01-E11] Show.mkv");
        let filter = SearchFilter {
            quality: Some("1080".into()),
            ..Default::default()
        };
        assert!(filter.matches(&bare));
    }

    #[test]
    fn search_filters_and_orders_by_episode() {
        let p = parser();
        let links = [
            "https://x/%5BS01-E03%5D%20Show%20%5B480p%5D.mkv",
            "https://x/%5BS01-E01%5D%20Show%20%5B480p%5D.mkv",
            "https://x/%5BS01-E02%5D%20Show%20%5B720p%5D.mkv",
            "https://x/%5BS02-E01%5D%20Show%20%5B480p%5D.mkv",
        ];
        let filter = SearchFilter {
            season: Some(1),
            quality: Some("480".into()),
            episode: None,
        };
        let hits = p.search(links, &filter);
        assert_eq!(hits, vec![links[1], links[0]]);
    }
}
