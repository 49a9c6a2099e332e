use serde::{Deserialize, Deserializer, Serialize};

use super::chapter::ChapterRef;

/// Last read position within a title. At most one per title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub manga_id: String,
    #[serde(deserialize_with = "chapter_ref")]
    pub chapter: ChapterRef,
    #[serde(rename = "imageIndex")]
    pub page_index: usize,
    #[serde(rename = "totalImages")]
    pub total_pages: usize,
    /// Milliseconds since the Unix epoch
    pub last_updated: i64,
    #[serde(default)]
    pub title: String,
}

fn chapter_ref<'de, D>(deserializer: D) -> Result<ChapterRef, D::Error>
where
    D: Deserializer<'de>,
{
    hondana_lib::models::string_or_number(deserializer).map(ChapterRef::from)
}
