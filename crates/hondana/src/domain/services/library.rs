use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::domain::{
    entities::{chapter::ChapterRef, manga::Manga, progress::ReadingProgress},
    repositories::storage::StorageRepository,
};

pub const FAVORITES_KEY: &str = "manga_favorites";
pub const PROGRESS_KEY: &str = "manga_progress";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Favorites and per-title reading progress. Loaded once, and every mutation
/// writes the affected collection back in full.
pub struct LibraryService<R>
where
    R: StorageRepository,
{
    repo: R,
    favorites: Vec<Manga>,
    progress: BTreeMap<String, ReadingProgress>,
}

impl<R> LibraryService<R>
where
    R: StorageRepository,
{
    /// Restore both collections from `repo`. Missing or malformed records load
    /// as empty collections.
    pub fn load(repo: R) -> Self {
        let favorites: Vec<Manga> = read_record(&repo, FAVORITES_KEY);
        let progress: BTreeMap<String, ReadingProgress> = read_record(&repo, PROGRESS_KEY);

        debug!(
            "loaded {} favorites and {} progress records",
            favorites.len(),
            progress.len()
        );

        Self {
            repo,
            favorites,
            progress,
        }
    }

    pub fn favorites(&self) -> &[Manga] {
        &self.favorites
    }

    pub fn is_favorite(&self, manga_id: &str) -> bool {
        self.favorites.iter().any(|f| f.manga_id == manga_id)
    }

    /// Remove `manga` from favorites if present, append it otherwise. Returns
    /// whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, manga: Manga) -> bool {
        let is_favorite = if self.is_favorite(&manga.manga_id) {
            self.favorites.retain(|f| f.manga_id != manga.manga_id);
            false
        } else {
            self.favorites.push(manga);
            true
        };

        write_record(&self.repo, FAVORITES_KEY, &self.favorites);

        is_favorite
    }

    /// Upsert the progress of `manga_id`. A missing or blank `title` falls back
    /// to the title cached in the previous record.
    pub fn save_progress(
        &mut self,
        manga_id: &str,
        chapter: &ChapterRef,
        page_index: usize,
        total_pages: usize,
        title: Option<&str>,
    ) -> &ReadingProgress {
        let last_updated = self.next_timestamp();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.progress
                    .get(manga_id)
                    .map(|p| p.title.clone())
                    .filter(|t| !t.trim().is_empty())
            })
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        debug!("save progress manga_id={manga_id} chapter={chapter} page={page_index}/{total_pages}");

        self.progress.insert(
            manga_id.to_string(),
            ReadingProgress {
                manga_id: manga_id.to_string(),
                chapter: chapter.clone(),
                page_index,
                total_pages,
                last_updated,
                title,
            },
        );

        write_record(&self.repo, PROGRESS_KEY, &self.progress);

        &self.progress[manga_id]
    }

    pub fn get_progress(&self, manga_id: &str) -> Option<&ReadingProgress> {
        self.progress.get(manga_id)
    }

    /// The most recently updated progress record across all titles
    pub fn last_read(&self) -> Option<&ReadingProgress> {
        self.progress.values().max_by(|a, b| {
            a.last_updated
                .cmp(&b.last_updated)
                .then_with(|| b.manga_id.cmp(&a.manga_id))
        })
    }

    /// All progress records, most recent first
    pub fn progress_list(&self) -> Vec<&ReadingProgress> {
        let mut list: Vec<&ReadingProgress> = self.progress.values().collect();
        list.sort_by(|a, b| {
            b.last_updated
                .cmp(&a.last_updated)
                .then_with(|| a.manga_id.cmp(&b.manga_id))
        });
        list
    }

    /// Chapter opened by "continue reading" on a title
    pub fn resume_chapter(&self, manga_id: &str) -> ChapterRef {
        self.get_progress(manga_id)
            .map(|p| p.chapter.clone())
            .unwrap_or_else(ChapterRef::first)
    }

    // Strictly increasing even if the wall clock stalls or steps back.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.progress.values().map(|p| p.last_updated).max() {
            Some(newest) if newest >= now => newest + 1,
            _ => now,
        }
    }
}

fn read_record<R, T>(repo: &R, key: &str) -> T
where
    R: StorageRepository,
    T: DeserializeOwned + Default,
{
    match repo.get_item(key) {
        Ok(Some(value)) => serde_json::from_str(&value).unwrap_or_else(|e| {
            warn!("discarding malformed {key}: {e}");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!("failed to read {key}: {e}");
            T::default()
        }
    }
}

fn write_record<R, T>(repo: &R, key: &str, record: &T)
where
    R: StorageRepository,
    T: Serialize + ?Sized,
{
    let value = match serde_json::to_string(record) {
        Ok(value) => value,
        Err(e) => {
            error!("failed to encode {key}: {e}");
            return;
        }
    };

    if let Err(e) = repo.set_item(key, &value) {
        error!("failed to write {key}: {e}");
    }
}
