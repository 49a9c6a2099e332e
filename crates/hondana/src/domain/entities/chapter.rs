use std::{cmp::Ordering, fmt};

use hondana_lib::models::MangaDetailResponse;
use serde::{Deserialize, Serialize};

/// Chapter identifier as served by the catalog. Not necessarily an integer,
/// "10.5" is a valid chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterRef(String);

impl ChapterRef {
    pub fn new<S: Into<String>>(chapter: S) -> Self {
        Self(chapter.into())
    }

    pub fn first() -> Self {
        Self("1".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the identifier, read the way a lenient float parser
    /// reads it: the longest numeric prefix wins, trailing text is ignored.
    pub fn number(&self) -> Option<f64> {
        leading_number(&self.0)
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChapterRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ChapterRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Order chapters by their numeric value. Identifiers without a numeric value
/// go last, keeping their relative order.
pub fn sort_chapters(chapters: &mut [ChapterRef]) {
    chapters.sort_by(|a, b| match (a.number(), b.number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// A chapter's page images, plus the title's whole chapter list which the
/// catalog sends along with every chapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterDetail {
    pub manga_id: Option<String>,
    pub images: Vec<String>,
    /// Numerically sorted
    pub chapters: Vec<ChapterRef>,
    pub current_chapter: Option<ChapterRef>,
    pub max_chapter: Option<f64>,
}

impl From<MangaDetailResponse> for ChapterDetail {
    fn from(res: MangaDetailResponse) -> Self {
        let mut chapters: Vec<ChapterRef> = res
            .chapter_list
            .unwrap_or_default()
            .into_iter()
            .map(|c| ChapterRef::from(c.chapter))
            .collect();
        sort_chapters(&mut chapters);

        Self {
            manga_id: res.manga_id,
            images: res.images.unwrap_or_default(),
            chapters,
            current_chapter: res.current_chapter.map(ChapterRef::from),
            max_chapter: res.max_chapter,
        }
    }
}
