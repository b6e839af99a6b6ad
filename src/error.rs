use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid bucket count: `{0}`, at least one bucket is required")]
    InvalidBucketCount(usize),
    #[error("invalid histogram window: `{0}` seconds, the window must be at least one second")]
    InvalidWindow(usize),
    #[error("encode error, {0}")]
    Encode(String),
    #[error("decode error, {0}")]
    Decode(String),
}
