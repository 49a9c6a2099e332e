use async_trait::async_trait;

use thiserror::Error;

use crate::domain::entities::{
    chapter::{ChapterDetail, ChapterRef},
    manga::Manga,
};

#[derive(Debug, Error)]
pub enum CatalogRepositoryError {
    #[error("request return error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("other error: {0}")]
    Other(String),
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Default listing when `query` is blank, search otherwise.
    async fn fetch_manga_list(
        &self,
        offset: i64,
        limit: i64,
        query: &str,
    ) -> Result<Vec<Manga>, CatalogRepositoryError>;

    async fn fetch_chapter_detail(
        &self,
        manga_id: &str,
        chapter: &ChapterRef,
    ) -> Result<ChapterDetail, CatalogRepositoryError>;
}
