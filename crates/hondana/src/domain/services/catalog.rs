use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{
    entities::{
        chapter::{ChapterDetail, ChapterRef},
        manga::Manga,
    },
    repositories::catalog::{CatalogRepository, CatalogRepositoryError},
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("repository error: {0}")]
    RepositoryError(#[from] CatalogRepositoryError),
}

#[derive(Debug, Default)]
struct CatalogState {
    manga_list: Vec<Manga>,
    loading: bool,
    error: Option<String>,
}

/// Catalog access plus the accumulated listing the discover view pages
/// through.
pub struct CatalogService<R>
where
    R: CatalogRepository,
{
    repo: R,
    state: Mutex<CatalogState>,
}

impl<R> CatalogService<R>
where
    R: CatalogRepository,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// Fetch one page of the listing, or of a search when `query` is not blank.
    /// `offset == 0` or `refresh` replaces the cached listing, any other offset
    /// appends to it.
    ///
    /// Returns `Ok(false)` without fetching when another listing fetch is in
    /// flight and `refresh` is not set.
    pub async fn fetch_manga_list(
        &self,
        refresh: bool,
        offset: i64,
        limit: i64,
        query: &str,
    ) -> Result<bool, CatalogError> {
        {
            let mut state = self.state.lock().await;
            if state.loading && !refresh {
                debug!("listing fetch already in flight, skipping offset={offset}");
                return Ok(false);
            }

            state.loading = true;
            state.error = None;
            if refresh {
                state.manga_list.clear();
            }
        }

        let result = self.repo.fetch_manga_list(offset, limit, query).await;

        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(manga) => {
                debug!("fetched {} titles offset={offset} query={query:?}", manga.len());
                if refresh || offset == 0 {
                    state.manga_list = manga;
                } else {
                    state.manga_list.extend(manga);
                }
                Ok(true)
            }
            Err(e) => {
                error!("failed to fetch manga list: {e}");
                state.error = Some(format!("Failed to load manga. {e}"));
                Err(e.into())
            }
        }
    }

    pub async fn manga_list(&self) -> Vec<Manga> {
        self.state.lock().await.manga_list.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Message of the last failed listing fetch, cleared by the next attempt
    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn find_manga(&self, manga_id: &str) -> Option<Manga> {
        self.state
            .lock()
            .await
            .manga_list
            .iter()
            .find(|m| m.manga_id == manga_id)
            .cloned()
    }

    pub async fn fetch_chapter_detail(
        &self,
        manga_id: &str,
        chapter: &ChapterRef,
    ) -> Result<ChapterDetail, CatalogError> {
        let detail = self
            .repo
            .fetch_chapter_detail(manga_id, chapter)
            .await
            .map_err(|e| {
                error!("failed to fetch chapter {chapter} of {manga_id}: {e}");
                e
            })?;

        Ok(detail)
    }

    /// Sorted chapter list of a title. The catalog has no chapter endpoint, the
    /// list rides along with every chapter detail, so the first chapter is
    /// requested for it.
    pub async fn fetch_chapters(&self, manga_id: &str) -> Result<Vec<ChapterRef>, CatalogError> {
        let detail = self
            .fetch_chapter_detail(manga_id, &ChapterRef::first())
            .await?;

        Ok(detail.chapters)
    }
}
