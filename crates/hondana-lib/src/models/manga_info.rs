use serde::{Deserialize, Deserializer, Serialize};

use super::identifier::string_or_number;

/// A title as returned by the `list` and `search` actions
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub manga_id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "genre_list")]
    pub genre: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MangaListResponse {
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub data: Option<Vec<MangaInfo>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Genre {
    List(Vec<String>),
    Joined(String),
}

// Some rows carry genres as a single comma separated cell.
pub fn genre_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let genre = match Option::<Genre>::deserialize(deserializer)? {
        Some(Genre::List(list)) => list,
        Some(Genre::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect(),
        None => vec![],
    };

    Ok(genre)
}
