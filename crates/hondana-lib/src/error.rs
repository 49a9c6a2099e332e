use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    #[error("identifier {0:?} contains a path separator or whitespace")]
    InvalidIdentifier(String),
}
