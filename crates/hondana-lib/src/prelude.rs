pub use crate::error::Error;
pub use crate::models::{
    ChapterInfo, MangaDetailResponse, MangaInfo, MangaListResponse, parse_identifier,
};
