pub mod identifier;
pub use identifier::*;

pub mod manga_info;
pub use manga_info::*;

pub mod chapter_info;
pub use chapter_info::*;
