use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed result record: {0}")]
    Record(#[from] serde_json::Error),
    #[error("Malformed preferences file: {0}")]
    ReadPreferences(#[from] toml::de::Error),
    #[error("Could not encode preferences: {0}")]
    WritePreferences(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
