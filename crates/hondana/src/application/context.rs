use std::time::Duration;

use crate::{
    application::reader::{
        Direction, Reader, ReaderOptions, RestoreAction, adjacent_chapter, uniform_layout,
    },
    domain::{
        entities::{
            chapter::ChapterRef,
            manga::{Manga, placeholder_title},
        },
        repositories::{catalog::CatalogRepository, storage::StorageRepository},
        services::{
            catalog::{CatalogError, CatalogService},
            library::{LibraryService, UNKNOWN_TITLE},
        },
    },
    infrastructure::config::Config,
};

const PAGE_GAP: f64 = 0.0;

/// Everything a view needs: configuration, the catalog and the library.
pub struct AppContext<C, S>
where
    C: CatalogRepository,
    S: StorageRepository,
{
    pub config: Config,
    pub catalog: CatalogService<C>,
    pub library: LibraryService<S>,
}

impl<C, S> AppContext<C, S>
where
    C: CatalogRepository,
    S: StorageRepository,
{
    pub fn new(config: Config, catalog_repo: C, storage_repo: S) -> Self {
        Self {
            config,
            catalog: CatalogService::new(catalog_repo),
            library: LibraryService::load(storage_repo),
        }
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            percentage_floor: self.config.percentage_floor,
            restore_delay: Duration::from_millis(self.config.restore_delay_ms),
        }
    }

    /// Title shown in the reader and cached with its progress
    pub async fn resolve_title(&self, manga_id: &str) -> String {
        if let Some(manga) = self.catalog.find_manga(manga_id).await {
            if !manga.title.trim().is_empty() {
                return manga.title;
            }
        }

        if let Some(manga) = self
            .library
            .favorites()
            .iter()
            .find(|m| m.manga_id == manga_id && !m.title.trim().is_empty())
        {
            return manga.title.clone();
        }

        let placeholder = placeholder_title(manga_id);
        self.library
            .get_progress(manga_id)
            .map(|p| p.title.clone())
            .filter(|t| {
                !t.trim().is_empty() && t != UNKNOWN_TITLE && !t.starts_with(&placeholder)
            })
            .unwrap_or(placeholder)
    }

    /// A title already known locally, from favorites or the cached listing
    pub async fn find_manga(&self, manga_id: &str) -> Option<Manga> {
        if let Some(manga) = self
            .library
            .favorites()
            .iter()
            .find(|m| m.manga_id == manga_id)
        {
            return Some(manga.clone());
        }

        self.catalog.find_manga(manga_id).await
    }

    /// Like [`AppContext::find_manga`], fetching the first listing page when
    /// the title is not known yet. Falls back to a placeholder.
    pub async fn lookup_manga(&self, manga_id: &str) -> Manga {
        if let Some(manga) = self.find_manga(manga_id).await {
            return manga;
        }

        match self
            .catalog
            .fetch_manga_list(false, 0, self.config.page_size, "")
            .await
        {
            Ok(_) => {
                if let Some(manga) = self.catalog.find_manga(manga_id).await {
                    return manga;
                }
            }
            Err(e) => warn!("could not look up {manga_id}: {e}"),
        }

        Manga::placeholder(manga_id, &self.config.cover_placeholder)
    }

    /// Add or remove a title from favorites. Returns whether it is now a
    /// favorite.
    pub async fn toggle_favorite(&mut self, manga_id: &str) -> bool {
        let manga = self.lookup_manga(manga_id).await;
        self.library.toggle_favorite(manga)
    }

    pub async fn open_reader(&self, manga_id: &str, chapter: ChapterRef) -> Reader {
        let title = self.resolve_title(manga_id).await;
        Reader::new(manga_id, &title, chapter, self.reader_options())
    }

    /// Read `chapter` of a title headlessly: load it, lay the pages out at the
    /// configured height, apply the restore jump and optionally scroll to
    /// `page`. The position is saved when the reader is closed.
    pub async fn read(
        &mut self,
        manga_id: &str,
        chapter: ChapterRef,
        page: Option<usize>,
    ) -> Result<Reader, CatalogError> {
        let mut reader = self.open_reader(manga_id, chapter.clone()).await;
        reader
            .load_chapter(chapter, &self.catalog, &self.library)
            .await?;

        let layout = uniform_layout(reader.total_pages(), self.config.page_height, PAGE_GAP);
        let restored = reader.settle_layout(layout).await;
        debug!("restored to {restored:?}");

        if let Some(page) = page {
            let top = reader
                .offset_of(page)
                .or_else(|| reader.offset_of(reader.total_pages().saturating_sub(1)));
            if let Some(top) = top {
                // align the page's middle with the viewport's middle
                let scroll_top =
                    top + self.config.page_height / 2.0 - self.config.viewport_height / 2.0;
                reader.on_scroll(&mut self.library, scroll_top, self.config.viewport_height);
            }
        } else if restored == Some(RestoreAction::ScrollToTop) {
            info!("starting {manga_id} chapter {} from the top", reader.chapter());
        }

        reader.close(&mut self.library);

        Ok(reader)
    }

    /// Read the chapter before or after the one stored for a title. `None`
    /// when there is nothing to move to.
    pub async fn read_adjacent(
        &mut self,
        manga_id: &str,
        direction: Direction,
    ) -> Result<Option<Reader>, CatalogError> {
        let current = self.library.resume_chapter(manga_id);
        let chapters = self.catalog.fetch_chapters(manga_id).await?;

        match adjacent_chapter(&chapters, &current, direction) {
            Some(target) => self.read(manga_id, target, None).await.map(Some),
            None => Ok(None),
        }
    }
}
