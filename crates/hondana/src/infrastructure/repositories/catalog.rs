use async_trait::async_trait;
use hondana_lib::models::{MangaDetailResponse, MangaListResponse};

use crate::domain::{
    entities::{
        chapter::{ChapterDetail, ChapterRef},
        manga::Manga,
    },
    repositories::catalog::{CatalogRepository, CatalogRepositoryError},
};

/// Catalog served over plain GET requests, the operation chosen by the
/// `action` query parameter.
#[derive(Clone)]
pub struct HttpCatalogRepository {
    client: reqwest::Client,
    api_url: String,
    cover_placeholder: String,
}

impl HttpCatalogRepository {
    pub fn new(api_url: &str, cover_placeholder: &str) -> Result<Self, CatalogRepositoryError> {
        if api_url.trim().is_empty() {
            return Err(CatalogRepositoryError::Other(
                "api url cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("hondana/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            cover_placeholder: cover_placeholder.to_string(),
        })
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<String, CatalogRepositoryError> {
        let body = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(body)
    }
}

#[async_trait]
impl CatalogRepository for HttpCatalogRepository {
    async fn fetch_manga_list(
        &self,
        offset: i64,
        limit: i64,
        query: &str,
    ) -> Result<Vec<Manga>, CatalogRepositoryError> {
        let params = list_params(offset, limit, query);
        debug!("fetch manga list {params:?}");

        let body = self.get(&params).await?;
        decode_manga_list(&body, &self.cover_placeholder)
    }

    async fn fetch_chapter_detail(
        &self,
        manga_id: &str,
        chapter: &ChapterRef,
    ) -> Result<ChapterDetail, CatalogRepositoryError> {
        let params = detail_params(manga_id, chapter);
        debug!("fetch chapter detail {params:?}");

        let body = self.get(&params).await?;
        decode_chapter_detail(&body)
    }
}

pub fn list_params(offset: i64, limit: i64, query: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![("offset", offset.to_string()), ("limit", limit.to_string())];

    let query = query.trim();
    if query.is_empty() {
        params.push(("action", "list".to_string()));
    } else {
        params.push(("action", "search".to_string()));
        params.push(("title", query.to_string()));
    }

    params
}

pub fn detail_params(manga_id: &str, chapter: &ChapterRef) -> Vec<(&'static str, String)> {
    vec![
        ("action", "detail".to_string()),
        ("mangaId", manga_id.to_string()),
        ("chapter", chapter.to_string()),
    ]
}

pub fn decode_manga_list(
    body: &str,
    cover_placeholder: &str,
) -> Result<Vec<Manga>, CatalogRepositoryError> {
    let res: MangaListResponse = serde_json::from_str(body)?;

    let Some(data) = res.data else {
        warn!("list response has no data field, treating as empty");
        return Ok(vec![]);
    };

    Ok(data
        .into_iter()
        .map(|m| Manga::from_info(m, cover_placeholder))
        .collect())
}

pub fn decode_chapter_detail(body: &str) -> Result<ChapterDetail, CatalogRepositoryError> {
    let res: MangaDetailResponse = serde_json::from_str(body)?;
    Ok(ChapterDetail::from(res))
}
