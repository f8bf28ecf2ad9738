use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovlensError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed coverage report: {0}")]
    MalformedReport(#[source] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown coverage format")]
    UnknownFormat,
}

impl From<serde_json::Error> for CovlensError {
    /// A read failure underneath the JSON decoder is still an I/O error;
    /// everything else means the document itself is broken.
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            CovlensError::Io(err.into())
        } else {
            CovlensError::MalformedReport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, CovlensError>;
