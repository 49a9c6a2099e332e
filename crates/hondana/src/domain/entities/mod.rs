pub mod chapter;
pub mod manga;
pub mod progress;
