use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no rows were supplied for the table export")]
    MissingRows,
    #[error("the snapshot region is not mounted")]
    RegionUnavailable,
    #[error("no \"download all\" action was supplied")]
    NoSecondaryAction,
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output was not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("snapshot rendering failed: {0}")]
    Raster(String),
    #[error("could not save {filename}: {message}")]
    Delivery { filename: String, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ExportError {
    /// Errors caused by how the widget was wired up rather than by the export itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExportError::MissingRows
                | ExportError::RegionUnavailable
                | ExportError::NoSecondaryAction
        )
    }

    pub(crate) fn delivery(filename: &str, message: impl Into<String>) -> Self {
        ExportError::Delivery {
            filename: filename.to_string(),
            message: message.into(),
        }
    }
}
