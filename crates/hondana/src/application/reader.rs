use std::time::Duration;

use crate::domain::{
    entities::chapter::ChapterRef,
    repositories::{catalog::CatalogRepository, storage::StorageRepository},
    services::{
        catalog::{CatalogError, CatalogService},
        library::LibraryService,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum ReaderState {
    Loading,
    Ready,
    Error(String),
}

/// Vertical extent of one rendered page, in scroll container coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageExtent {
    pub top: f64,
    pub height: f64,
}

impl PageExtent {
    pub fn contains(&self, y: f64) -> bool {
        self.top <= y && y < self.top + self.height
    }
}

/// Jump to perform once the pages of a freshly loaded chapter are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreAction {
    ScrollToPage(usize),
    ScrollToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderOptions {
    /// Lower bound of `read_percentage` once a chapter has pages
    pub percentage_floor: f64,
    /// Wait before measuring page offsets for the restore jump
    pub restore_delay: Duration,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            percentage_floor: 5.0,
            restore_delay: Duration::from_millis(100),
        }
    }
}

/// Continuous vertical reader for one title. Tracks which page sits under the
/// middle of the viewport and records it as the title's reading progress.
pub struct Reader {
    manga_id: String,
    title: String,
    chapter: ChapterRef,
    state: ReaderState,
    images: Vec<String>,
    chapters: Vec<ChapterRef>,
    layout: Vec<PageExtent>,
    current_page: usize,
    pending_restore: Option<RestoreAction>,
    options: ReaderOptions,
}

impl Reader {
    pub fn new(manga_id: &str, title: &str, chapter: ChapterRef, options: ReaderOptions) -> Self {
        Self {
            manga_id: manga_id.to_string(),
            title: title.to_string(),
            chapter,
            state: ReaderState::Loading,
            images: vec![],
            chapters: vec![],
            layout: vec![],
            current_page: 0,
            pending_restore: None,
            options,
        }
    }

    /// Fetch the pages of `chapter`. On success the reader is `Ready` with a
    /// restore jump pending until the next [`Reader::set_layout`].
    pub async fn load_chapter<C, S>(
        &mut self,
        chapter: ChapterRef,
        catalog: &CatalogService<C>,
        library: &LibraryService<S>,
    ) -> Result<(), CatalogError>
    where
        C: CatalogRepository,
        S: StorageRepository,
    {
        self.chapter = chapter;
        self.state = ReaderState::Loading;
        self.images.clear();
        self.chapters.clear();
        self.layout.clear();
        self.current_page = 0;
        self.pending_restore = None;

        let restore_page = library
            .get_progress(&self.manga_id)
            .filter(|p| p.chapter == self.chapter)
            .map(|p| p.page_index);

        match catalog
            .fetch_chapter_detail(&self.manga_id, &self.chapter)
            .await
        {
            Ok(detail) => {
                info!(
                    "loaded chapter {} of {} with {} pages",
                    self.chapter,
                    self.manga_id,
                    detail.images.len()
                );
                self.images = detail.images;
                self.chapters = detail.chapters;
                self.pending_restore = Some(match restore_page {
                    Some(page) => RestoreAction::ScrollToPage(page),
                    None => RestoreAction::ScrollToTop,
                });
                self.state = ReaderState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = ReaderState::Error("Failed to load chapter.".to_string());
                Err(e)
            }
        }
    }

    /// Load the current chapter again, typically after an error
    pub async fn retry<C, S>(
        &mut self,
        catalog: &CatalogService<C>,
        library: &LibraryService<S>,
    ) -> Result<(), CatalogError>
    where
        C: CatalogRepository,
        S: StorageRepository,
    {
        let chapter = self.chapter.clone();
        self.load_chapter(chapter, catalog, library).await
    }

    /// Record where the pages ended up. The first call after a load returns the
    /// pending restore jump and moves the current page there; later calls only
    /// update the geometry.
    pub fn set_layout(&mut self, layout: Vec<PageExtent>) -> Option<RestoreAction> {
        if self.state != ReaderState::Ready {
            return None;
        }

        self.layout = layout;

        let action = match self.pending_restore.take()? {
            RestoreAction::ScrollToPage(page) if !self.images.is_empty() => {
                RestoreAction::ScrollToPage(page.min(self.images.len() - 1))
            }
            _ => RestoreAction::ScrollToTop,
        };

        self.current_page = match action {
            RestoreAction::ScrollToPage(page) => page,
            RestoreAction::ScrollToTop => 0,
        };
        debug!("restore {action:?}");

        Some(action)
    }

    /// [`Reader::set_layout`] after a short pause, giving images time to take
    /// their final size before offsets are trusted.
    pub async fn settle_layout(&mut self, layout: Vec<PageExtent>) -> Option<RestoreAction> {
        tokio::time::sleep(self.options.restore_delay).await;
        self.set_layout(layout)
    }

    /// Index of the page whose extent contains `y`
    pub fn page_at(&self, y: f64) -> Option<usize> {
        self.layout.iter().position(|page| page.contains(y))
    }

    /// Scroll offset that brings `page` to the top of the viewport
    pub fn offset_of(&self, page: usize) -> Option<f64> {
        self.layout.get(page).map(|extent| extent.top)
    }

    /// Handle a scroll event. When the viewport's midpoint has moved into a
    /// different page, that page becomes current and is saved as progress.
    /// Returns the new page index if it changed.
    pub fn on_scroll<S>(
        &mut self,
        library: &mut LibraryService<S>,
        scroll_top: f64,
        viewport_height: f64,
    ) -> Option<usize>
    where
        S: StorageRepository,
    {
        if self.state != ReaderState::Ready {
            return None;
        }

        let midpoint = scroll_top + viewport_height / 2.0;
        let page = self.page_at(midpoint)?;
        if page == self.current_page {
            return None;
        }

        self.current_page = page;
        self.save_progress(library);

        Some(page)
    }

    /// Save the position one last time when leaving the reader
    pub fn close<S>(&self, library: &mut LibraryService<S>)
    where
        S: StorageRepository,
    {
        if self.state == ReaderState::Ready && !self.images.is_empty() {
            self.save_progress(library);
        }
    }

    fn save_progress<S>(&self, library: &mut LibraryService<S>)
    where
        S: StorageRepository,
    {
        library.save_progress(
            &self.manga_id,
            &self.chapter,
            self.current_page,
            self.images.len(),
            Some(&self.title),
        );
    }

    pub fn read_percentage(&self) -> f64 {
        read_percentage(
            self.current_page,
            self.images.len(),
            self.options.percentage_floor,
        )
    }

    pub fn is_first_chapter(&self) -> bool {
        is_first_chapter(&self.chapters, &self.chapter)
    }

    pub fn is_last_chapter(&self) -> bool {
        is_last_chapter(&self.chapters, &self.chapter)
    }

    /// Chapter before or after the current one in the sorted chapter list
    pub fn adjacent_chapter(&self, direction: Direction) -> Option<ChapterRef> {
        adjacent_chapter(&self.chapters, &self.chapter, direction)
    }

    /// Target of picking `chapter` from the chapter list, `None` when it is
    /// the chapter already open.
    pub fn jump_to_chapter(&self, chapter: &ChapterRef) -> Option<ChapterRef> {
        (chapter != &self.chapter).then(|| chapter.clone())
    }

    pub fn manga_id(&self) -> &str {
        &self.manga_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chapter(&self) -> &ChapterRef {
        &self.chapter
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn chapters(&self) -> &[ChapterRef] {
        &self.chapters
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.images.len()
    }
}

/// Share of the chapter read, in percent, counting the current page as read
pub fn read_percentage(current_page: usize, total_pages: usize, floor: f64) -> f64 {
    if total_pages == 0 {
        return 0.0;
    }

    let percentage = (current_page + 1) as f64 / total_pages as f64 * 100.0;
    percentage.max(floor).min(100.0)
}

pub fn is_first_chapter(chapters: &[ChapterRef], current: &ChapterRef) -> bool {
    chapters.first().is_none_or(|first| first == current)
}

pub fn is_last_chapter(chapters: &[ChapterRef], current: &ChapterRef) -> bool {
    chapters.last().is_none_or(|last| last == current)
}

/// Neighbour of `current` in `chapters`, which must be sorted. Moving past
/// either end, or from a chapter not in the list, goes nowhere.
pub fn adjacent_chapter(
    chapters: &[ChapterRef],
    current: &ChapterRef,
    direction: Direction,
) -> Option<ChapterRef> {
    let index = chapters.iter().position(|c| c == current)?;
    let target = match direction {
        Direction::Prev => index.checked_sub(1)?,
        Direction::Next => index + 1,
    };

    chapters.get(target).cloned()
}

/// Pages of equal height stacked with `gap` between them, for headless use
pub fn uniform_layout(pages: usize, page_height: f64, gap: f64) -> Vec<PageExtent> {
    (0..pages)
        .map(|i| PageExtent {
            top: i as f64 * (page_height + gap),
            height: page_height,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        domain::services::catalog::test::MockCatalogRepository,
        infrastructure::repositories::storage::MemoryStorageRepository,
    };

    const PAGE: f64 = 1000.0;
    const VIEWPORT: f64 = 800.0;

    fn refs(ids: &[&str]) -> Vec<ChapterRef> {
        ids.iter().map(|id| ChapterRef::from(*id)).collect()
    }

    fn setup() -> (
        CatalogService<MockCatalogRepository>,
        LibraryService<MemoryStorageRepository>,
    ) {
        let catalog = CatalogService::new(MockCatalogRepository {
            chapters: vec!["1", "2", "3", "4", "10.5"],
            ..Default::default()
        });
        let library = LibraryService::load(MemoryStorageRepository::new());
        (catalog, library)
    }

    fn options() -> ReaderOptions {
        ReaderOptions {
            percentage_floor: 5.0,
            restore_delay: Duration::from_millis(1),
        }
    }

    // scroll_top that puts the viewport midpoint in the middle of `page`
    fn scroll_to(page: usize) -> f64 {
        page as f64 * PAGE + PAGE / 2.0 - VIEWPORT / 2.0
    }

    #[test]
    fn test_read_percentage() {
        assert_eq!(read_percentage(0, 0, 5.0), 0.0);
        assert_eq!(read_percentage(4, 5, 5.0), 100.0);
        assert_eq!(read_percentage(1, 4, 5.0), 50.0);
        assert_eq!(read_percentage(0, 100, 5.0), 5.0);
        assert_eq!(read_percentage(0, 100, 0.0), 1.0);
        assert_eq!(read_percentage(9, 5, 0.0), 100.0);
    }

    #[test]
    fn test_chapter_bounds() {
        let chapters = refs(&["1", "2", "10.5", "11"]);
        assert!(is_first_chapter(&chapters, &ChapterRef::from("1")));
        assert!(!is_last_chapter(&chapters, &ChapterRef::from("1")));
        assert!(is_last_chapter(&chapters, &ChapterRef::from("11")));
        assert!(!is_first_chapter(&chapters, &ChapterRef::from("10.5")));

        assert!(is_first_chapter(&[], &ChapterRef::from("3")));
        assert!(is_last_chapter(&[], &ChapterRef::from("3")));
    }

    #[test]
    fn test_adjacent_chapter() {
        let chapters = refs(&["1", "2", "10.5", "11"]);
        let next = adjacent_chapter(&chapters, &ChapterRef::from("2"), Direction::Next);
        assert_eq!(next, Some(ChapterRef::from("10.5")));
        let prev = adjacent_chapter(&chapters, &ChapterRef::from("11"), Direction::Prev);
        assert_eq!(prev, Some(ChapterRef::from("10.5")));

        assert_eq!(adjacent_chapter(&chapters, &ChapterRef::from("1"), Direction::Prev), None);
        assert_eq!(adjacent_chapter(&chapters, &ChapterRef::from("11"), Direction::Next), None);
        assert_eq!(adjacent_chapter(&chapters, &ChapterRef::from("5"), Direction::Next), None);
        assert_eq!(adjacent_chapter(&[], &ChapterRef::from("1"), Direction::Next), None);
    }

    #[test]
    fn test_page_extent_contains() {
        let extent = PageExtent {
            top: 100.0,
            height: 50.0,
        };
        assert!(extent.contains(100.0));
        assert!(extent.contains(149.9));
        assert!(!extent.contains(150.0));
        assert!(!extent.contains(99.9));
    }

    #[tokio::test]
    async fn test_restore_into_stored_chapter() {
        let (catalog, mut library) = setup();
        library.save_progress("8", &ChapterRef::from("3"), 7, 12, Some("Ajin"));

        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("1"), options());
        reader
            .load_chapter(ChapterRef::from("3"), &catalog, &library)
            .await
            .unwrap();
        assert_eq!(reader.state(), &ReaderState::Ready);

        // the mock only serves two pages
        reader.images = (0..12).map(|i| format!("https://img/{i}.jpg")).collect();
        let layout = uniform_layout(12, PAGE, 0.0);

        assert_eq!(
            reader.settle_layout(layout.clone()).await,
            Some(RestoreAction::ScrollToPage(7))
        );
        assert_eq!(reader.current_page(), 7);
        // one-shot
        assert_eq!(reader.set_layout(layout), None);
        assert_eq!(reader.current_page(), 7);
    }

    #[tokio::test]
    async fn test_restore_into_other_chapter_resets() {
        let (catalog, mut library) = setup();
        library.save_progress("8", &ChapterRef::from("3"), 7, 12, Some("Ajin"));

        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("4"), options());
        reader
            .load_chapter(ChapterRef::from("4"), &catalog, &library)
            .await
            .unwrap();

        let action = reader.set_layout(uniform_layout(2, PAGE, 0.0));
        assert_eq!(action, Some(RestoreAction::ScrollToTop));
        assert_eq!(reader.current_page(), 0);
    }

    #[tokio::test]
    async fn test_restore_clamps_to_last_page() {
        let (catalog, mut library) = setup();
        library.save_progress("8", &ChapterRef::from("3"), 30, 40, None);

        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("3"), options());
        reader
            .load_chapter(ChapterRef::from("3"), &catalog, &library)
            .await
            .unwrap();

        let action = reader.set_layout(uniform_layout(2, PAGE, 0.0));
        assert_eq!(action, Some(RestoreAction::ScrollToPage(1)));
    }

    #[tokio::test]
    async fn test_scroll_tracking_saves_on_change() {
        let (catalog, mut library) = setup();
        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("2"), options());
        reader
            .load_chapter(ChapterRef::from("2"), &catalog, &library)
            .await
            .unwrap();
        reader.set_layout(uniform_layout(2, PAGE, 4.0));

        // midpoint still inside page 0
        assert_eq!(reader.on_scroll(&mut library, 0.0, VIEWPORT), None);
        assert!(library.get_progress("8").is_none());

        assert_eq!(reader.on_scroll(&mut library, scroll_to(1), VIEWPORT), Some(1));
        let saved = library.get_progress("8").unwrap().clone();
        assert_eq!(saved.chapter, ChapterRef::from("2"));
        assert_eq!(saved.page_index, 1);
        assert_eq!(saved.total_pages, 2);
        assert_eq!(saved.title, "Ajin");

        // jitter inside the same page writes nothing
        assert_eq!(reader.on_scroll(&mut library, scroll_to(1) + 3.0, VIEWPORT), None);
        assert_eq!(library.get_progress("8").unwrap().last_updated, saved.last_updated);

        assert_eq!(reader.read_percentage(), 100.0);
    }

    #[tokio::test]
    async fn test_midpoint_in_gap_keeps_page() {
        let (catalog, mut library) = setup();
        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("2"), options());
        reader
            .load_chapter(ChapterRef::from("2"), &catalog, &library)
            .await
            .unwrap();
        reader.set_layout(uniform_layout(2, PAGE, 200.0));
        reader.on_scroll(&mut library, scroll_to(1) + 200.0, VIEWPORT);
        assert_eq!(reader.current_page(), 1);

        // midpoint past the last page, in the trailing spacer
        assert_eq!(reader.on_scroll(&mut library, 5000.0, VIEWPORT), None);
        assert_eq!(reader.current_page(), 1);

        // midpoint in the gap between page 0 and 1
        assert_eq!(reader.on_scroll(&mut library, 1100.0 - VIEWPORT / 2.0, VIEWPORT), None);
        assert_eq!(reader.current_page(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_and_retry() {
        let library = LibraryService::load(MemoryStorageRepository::new());
        let failing = CatalogService::new(MockCatalogRepository {
            fail: true,
            ..Default::default()
        });

        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("1"), options());
        assert!(
            reader
                .load_chapter(ChapterRef::from("1"), &failing, &library)
                .await
                .is_err()
        );
        assert!(matches!(reader.state(), ReaderState::Error(_)));
        assert_eq!(reader.set_layout(uniform_layout(2, PAGE, 0.0)), None);

        let (catalog, _) = setup();
        reader.retry(&catalog, &library).await.unwrap();
        assert_eq!(reader.state(), &ReaderState::Ready);
        assert_eq!(reader.chapter(), &ChapterRef::from("1"));
        assert_eq!(reader.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_drops_previous_chapter_list() {
        let (catalog, library) = setup();
        let failing = CatalogService::new(MockCatalogRepository {
            fail: true,
            ..Default::default()
        });

        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("2"), options());
        reader
            .load_chapter(ChapterRef::from("2"), &catalog, &library)
            .await
            .unwrap();
        assert_eq!(reader.chapters().len(), 5);

        assert!(
            reader
                .load_chapter(ChapterRef::from("3"), &failing, &library)
                .await
                .is_err()
        );
        assert!(reader.chapters().is_empty());
        assert_eq!(reader.total_pages(), 0);
        assert_eq!(reader.adjacent_chapter(Direction::Next), None);
    }

    #[tokio::test]
    async fn test_scroll_ignored_until_ready() {
        let (_, mut library) = setup();
        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("2"), options());
        assert_eq!(reader.on_scroll(&mut library, scroll_to(1), VIEWPORT), None);
        reader.close(&mut library);
        assert!(library.get_progress("8").is_none());
    }

    #[tokio::test]
    async fn test_close_saves_position() {
        let (catalog, mut library) = setup();
        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("3"), options());
        reader
            .load_chapter(ChapterRef::from("3"), &catalog, &library)
            .await
            .unwrap();
        reader.set_layout(uniform_layout(2, PAGE, 0.0));
        reader.close(&mut library);

        let saved = library.get_progress("8").unwrap();
        assert_eq!(saved.chapter, ChapterRef::from("3"));
        assert_eq!(saved.page_index, 0);
    }

    #[tokio::test]
    async fn test_chapter_navigation() {
        let (catalog, library) = setup();
        let mut reader = Reader::new("8", "Ajin", ChapterRef::from("4"), options());
        reader
            .load_chapter(ChapterRef::from("4"), &catalog, &library)
            .await
            .unwrap();

        assert_eq!(reader.chapters(), refs(&["1", "2", "3", "4", "10.5"]).as_slice());
        assert_eq!(reader.adjacent_chapter(Direction::Next), Some(ChapterRef::from("10.5")));
        assert_eq!(reader.adjacent_chapter(Direction::Prev), Some(ChapterRef::from("3")));
        assert!(!reader.is_first_chapter());
        assert!(!reader.is_last_chapter());

        assert_eq!(reader.jump_to_chapter(&ChapterRef::from("4")), None);
        assert_eq!(
            reader.jump_to_chapter(&ChapterRef::from("1")),
            Some(ChapterRef::from("1"))
        );

        reader
            .load_chapter(ChapterRef::from("10.5"), &catalog, &library)
            .await
            .unwrap();
        assert!(reader.is_last_chapter());
        assert_eq!(reader.adjacent_chapter(Direction::Next), None);
    }
}
