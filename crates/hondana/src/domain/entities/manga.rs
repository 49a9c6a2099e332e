use hondana_lib::models::{MangaInfo, genre_list, string_or_number};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_COVER_PLACEHOLDER: &str = "https://picsum.photos/seed/{id}/300/450";

/// A title as shown in listings and stored in favorites. Field names follow the
/// catalog's camelCase so persisted favorites stay readable by other clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manga {
    #[serde(deserialize_with = "string_or_number")]
    pub manga_id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "genre_list")]
    pub genre: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cover_image: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Manga {
    pub fn from_info(m: MangaInfo, cover_placeholder: &str) -> Self {
        let cover_image = match m.cover_image {
            Some(url) if !url.trim().is_empty() => url,
            _ => placeholder_cover_url(cover_placeholder, &m.manga_id),
        };

        Self {
            kind: m.kind.unwrap_or_default(),
            title: m.title.unwrap_or_default(),
            description: m.description.unwrap_or_default(),
            genre: m.genre,
            cover_image,
            manga_id: m.manga_id,
        }
    }

    /// Stand-in for a title the catalog did not return, e.g. when toggling a
    /// favorite by id alone.
    pub fn placeholder(manga_id: &str, cover_placeholder: &str) -> Self {
        Self {
            manga_id: manga_id.to_string(),
            kind: String::new(),
            title: placeholder_title(manga_id),
            description: String::new(),
            genre: vec![],
            cover_image: placeholder_cover_url(cover_placeholder, manga_id),
        }
    }
}

impl From<MangaInfo> for Manga {
    fn from(m: MangaInfo) -> Self {
        Self::from_info(m, DEFAULT_COVER_PLACEHOLDER)
    }
}

pub fn placeholder_cover_url(template: &str, manga_id: &str) -> String {
    template.replace("{id}", manga_id)
}

pub fn placeholder_title(manga_id: &str) -> String {
    format!("Manga {manga_id}")
}

#[cfg(test)]
mod test {
    use super::*;

    fn info(id: &str, cover: Option<&str>) -> MangaInfo {
        MangaInfo {
            manga_id: id.to_string(),
            kind: None,
            title: Some("Title".to_string()),
            description: None,
            genre: vec![],
            cover_image: cover.map(str::to_string),
        }
    }

    #[test]
    fn test_cover_fallback() {
        let manga = Manga::from(info("17", None));
        assert_eq!(manga.cover_image, "https://picsum.photos/seed/17/300/450");

        let manga = Manga::from(info("17", Some("")));
        assert_eq!(manga.cover_image, "https://picsum.photos/seed/17/300/450");

        let manga = Manga::from(info("17", Some("https://img/17.jpg")));
        assert_eq!(manga.cover_image, "https://img/17.jpg");
    }

    #[test]
    fn test_cover_fallback_is_deterministic() {
        let a = Manga::from_info(info("abc", None), "https://covers/{id}.png");
        let b = Manga::from_info(info("abc", None), "https://covers/{id}.png");
        assert_eq!(a.cover_image, "https://covers/abc.png");
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_stored_record_leniently() {
        let manga: Manga = serde_json::from_str(
            r#"{"mangaId":42,"type":null,"title":null,"description":null,"genre":"Action, Drama","coverImage":null}"#,
        )
        .unwrap();
        assert_eq!(manga.manga_id, "42");
        assert_eq!(manga.kind, "");
        assert_eq!(manga.title, "");
        assert_eq!(manga.genre, vec!["Action", "Drama"]);
        assert_eq!(manga.cover_image, "");

        let manga: Manga = serde_json::from_str(r#"{"mangaId":"7"}"#).unwrap();
        assert_eq!(manga.manga_id, "7");
        assert!(manga.genre.is_empty());
    }

    #[test]
    fn test_placeholder() {
        let manga = Manga::placeholder("5", DEFAULT_COVER_PLACEHOLDER);
        assert_eq!(manga.title, "Manga 5");
        assert_eq!(manga.cover_image, "https://picsum.photos/seed/5/300/450");
    }
}
