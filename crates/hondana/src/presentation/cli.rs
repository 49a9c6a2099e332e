use std::io::Write;

use clap::{Parser, Subcommand};
use hondana_lib::prelude::parse_identifier;

use crate::{
    application::{
        context::AppContext,
        reader::{Direction, Reader, ReaderState, read_percentage},
    },
    domain::{
        entities::{chapter::ChapterRef, manga::Manga, progress::ReadingProgress},
        repositories::{catalog::CatalogRepository, storage::StorageRepository},
    },
    presentation::route::Route,
};

#[derive(Parser, Debug)]
#[clap(version, about = "Browse the manga catalog and keep track of your reading")]
pub struct Opts {
    /// Path to config file
    #[clap(long)]
    pub config: Option<String>,
    /// Keep favorites and progress in memory only
    #[clap(long)]
    pub ephemeral: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List titles, or search them by title
    List {
        #[clap(long, default_value_t = 0)]
        offset: i64,
        #[clap(long)]
        limit: Option<i64>,
        #[clap(long, short)]
        query: Option<String>,
    },
    /// Show favorites
    Favorites,
    /// Add a title to favorites, or remove it
    Favorite { id: String },
    /// Show the chapters of a title
    Chapters { id: String },
    /// Read a chapter, by default the one last read
    Read {
        id: String,
        chapter: Option<String>,
        /// Zero-based page to scroll to
        #[clap(long)]
        page: Option<usize>,
    },
    /// Read the chapter after the one last read
    Next { id: String },
    /// Read the chapter before the one last read
    Prev { id: String },
    /// Show the title read most recently
    Resume,
    /// Show reading progress of every title
    History,
    /// Open a route such as /manga/42 or /read/42/3
    Open { route: String },
}

impl Command {
    fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::Discover => Some(Command::List {
                offset: 0,
                limit: None,
                query: None,
            }),
            Route::Favorites => Some(Command::Favorites),
            Route::Manga(id) => Some(Command::Chapters { id: id.clone() }),
            Route::Reader(id, chapter) => Some(Command::Read {
                id: id.clone(),
                chapter: Some(chapter.to_string()),
                page: None,
            }),
            Route::NotFound => None,
        }
    }
}

pub async fn execute<C, S, W>(
    ctx: &mut AppContext<C, S>,
    command: Command,
    out: &mut W,
) -> Result<(), anyhow::Error>
where
    C: CatalogRepository,
    S: StorageRepository,
    W: Write,
{
    let command = match command {
        Command::Open { route } => {
            Command::from_route(&Route::parse(&route)).unwrap_or(Command::Open { route })
        }
        command => command,
    };

    match command {
        Command::List {
            offset,
            limit,
            query,
        } => {
            let limit = limit.unwrap_or(ctx.config.page_size);
            let query = query.unwrap_or_default();
            if ctx
                .catalog
                .fetch_manga_list(offset == 0, offset, limit, &query)
                .await
                .is_err()
            {
                let error = ctx.catalog.error().await.unwrap_or_default();
                writeln!(out, "{error}")?;
                return Ok(());
            }

            let manga = ctx.catalog.manga_list().await;
            if manga.is_empty() {
                writeln!(out, "No manga found.")?;
            }
            for m in &manga {
                write_manga(out, m, ctx.library.is_favorite(&m.manga_id))?;
            }
        }
        Command::Favorites => {
            if ctx.library.favorites().is_empty() {
                writeln!(out, "No favorites yet.")?;
            }
            for m in ctx.library.favorites() {
                write_manga(out, m, true)?;
            }
        }
        Command::Favorite { id } => {
            let id = parse_identifier(&id)?;
            let added = ctx.toggle_favorite(&id).await;
            let verb = if added { "Added" } else { "Removed" };
            writeln!(out, "{verb} {id}")?;
        }
        Command::Chapters { id } => {
            let id = parse_identifier(&id)?;
            let title = ctx.resolve_title(&id).await;
            let chapters = match ctx.catalog.fetch_chapters(&id).await {
                Ok(chapters) => chapters,
                Err(_) => {
                    writeln!(out, "Failed to load chapters. Run the command again to retry.")?;
                    return Ok(());
                }
            };

            let resume = ctx.library.resume_chapter(&id);
            writeln!(out, "{title}")?;
            for chapter in &chapters {
                let marker = if chapter == &resume { "*" } else { " " };
                writeln!(out, "{marker} Chapter {chapter}")?;
            }
        }
        Command::Read { id, chapter, page } => {
            let id = parse_identifier(&id)?;
            let chapter = match chapter {
                Some(chapter) => ChapterRef::new(parse_identifier(&chapter)?),
                None => ctx.library.resume_chapter(&id),
            };
            match ctx.read(&id, chapter, page).await {
                Ok(reader) => write_reader(out, &reader)?,
                Err(_) => writeln!(out, "Failed to load chapter. Run the command again to retry.")?,
            }
        }
        Command::Next { id } => navigate(ctx, &id, Direction::Next, out).await?,
        Command::Prev { id } => navigate(ctx, &id, Direction::Prev, out).await?,
        Command::Resume => match ctx.library.last_read() {
            Some(progress) => write_progress(out, progress, ctx.config.percentage_floor)?,
            None => writeln!(out, "Nothing read yet.")?,
        },
        Command::History => {
            let list = ctx.library.progress_list();
            if list.is_empty() {
                writeln!(out, "Nothing read yet.")?;
            }
            for progress in list {
                write_progress(out, progress, ctx.config.percentage_floor)?;
            }
        }
        Command::Open { route } => writeln!(out, "Page not found: {route}")?,
    }

    Ok(())
}

async fn navigate<C, S, W>(
    ctx: &mut AppContext<C, S>,
    id: &str,
    direction: Direction,
    out: &mut W,
) -> Result<(), anyhow::Error>
where
    C: CatalogRepository,
    S: StorageRepository,
    W: Write,
{
    let id = parse_identifier(id)?;
    match ctx.read_adjacent(&id, direction).await {
        Ok(Some(reader)) => write_reader(out, &reader)?,
        Ok(None) => {
            let edge = match direction {
                Direction::Prev => "first",
                Direction::Next => "last",
            };
            writeln!(out, "Already at the {edge} chapter.")?;
        }
        Err(_) => writeln!(out, "Failed to load chapter. Run the command again to retry.")?,
    }

    Ok(())
}

fn write_manga<W: Write>(out: &mut W, manga: &Manga, favorite: bool) -> std::io::Result<()> {
    let marker = if favorite { "♥" } else { " " };
    writeln!(
        out,
        "{marker} {}\t{}\t{}",
        manga.manga_id,
        manga.title,
        manga.genre.join(", ")
    )
}

fn write_reader<W: Write>(out: &mut W, reader: &Reader) -> std::io::Result<()> {
    if let ReaderState::Error(message) = reader.state() {
        return writeln!(out, "{message}");
    }

    writeln!(out, "{} - Chapter {}", reader.title(), reader.chapter())?;
    if reader.total_pages() == 0 {
        return writeln!(out, "No pages available.");
    }
    writeln!(
        out,
        "Page {}/{} ({:.0}%)",
        reader.current_page() + 1,
        reader.total_pages(),
        reader.read_percentage()
    )?;

    let prev = if reader.is_first_chapter() { "-" } else { "prev" };
    let next = if reader.is_last_chapter() { "-" } else { "next" };
    writeln!(out, "[{prev}] [{next}]")
}

fn write_progress<W: Write>(
    out: &mut W,
    progress: &ReadingProgress,
    percentage_floor: f64,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{} ({})\tChapter {}\tPage {}/{}\t{:.0}%",
        progress.title,
        progress.manga_id,
        progress.chapter,
        progress.page_index + 1,
        progress.total_pages,
        read_percentage(progress.page_index, progress.total_pages, percentage_floor)
    )
}
