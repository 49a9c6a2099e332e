use hondana_lib::prelude::parse_identifier;

use crate::domain::entities::chapter::ChapterRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Discover,
    Favorites,
    Manga(String),
    Reader(String, ChapterRef),
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut paths = path.split('/').collect::<Vec<_>>();
        paths.retain(|path| !path.is_empty());

        match paths.as_slice() {
            [] => Route::Discover,
            ["favorites"] => Route::Favorites,
            ["manga", id] => match parse_identifier(id) {
                Ok(id) => Route::Manga(id),
                Err(_) => Route::NotFound,
            },
            ["read", id, chapter] => match (parse_identifier(id), parse_identifier(chapter)) {
                (Ok(id), Ok(chapter)) => Route::Reader(id, ChapterRef::new(chapter)),
                _ => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }

    pub fn url(&self) -> String {
        match self {
            Route::Discover => "/".to_string(),
            Route::Favorites => "/favorites".to_string(),
            Route::Manga(manga_id) => ["/manga", manga_id].join("/"),
            Route::Reader(manga_id, chapter) => format!("/read/{}/{}", manga_id, chapter),
            Route::NotFound => "/notfound".to_string(),
        }
    }
}
