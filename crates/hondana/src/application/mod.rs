pub mod context;
pub mod reader;
