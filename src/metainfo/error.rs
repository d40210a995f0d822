use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("invalid torrent file size: {0}")]
    InvalidFileSize(i64),

    #[error("torrent file has no path")]
    EmptyFilePath,

    #[error("invalid info hash length")]
    InvalidInfoHashLength,
}
