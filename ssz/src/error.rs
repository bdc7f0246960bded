use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} out of bounds for list of length {length}")]
    IndexOutOfBounds { index: usize, length: usize },
}
