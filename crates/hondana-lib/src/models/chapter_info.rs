use serde::{Deserialize, Serialize};

use super::identifier::{option_string_or_number, string_or_number};

/// One entry of the side channel chapter list in a `detail` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChapterInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub chapter: String,
}

/// Response of the `detail` action. Both `images` and `chapterList` may be
/// missing when the backend has nothing for the requested chapter.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaDetailResponse {
    #[serde(default, deserialize_with = "option_string_or_number")]
    pub manga_id: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub chapter_list: Option<Vec<ChapterInfo>>,
    #[serde(default, deserialize_with = "option_string_or_number")]
    pub current_chapter: Option<String>,
    #[serde(default)]
    pub max_chapter: Option<f64>,
}
