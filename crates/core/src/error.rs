#[derive(Debug, thiserror::Error)]
pub enum EraError {
    #[error("{0}")]
    Validation(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("generation provider error ({status}): {body}")]
    Provider { status: u16, body: String },
    #[error("failed to reach generation provider: {0}")]
    ProviderTransport(reqwest::Error),
    #[error("failed to read generation provider response: {0}")]
    ProviderBody(reqwest::Error),

    #[error("failed to send email: {0}")]
    Email(String),
    #[error("invalid email address {address:?}: {source}")]
    EmailAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to create upload directory: {0}")]
    UploadDirCreation(std::io::Error),
    #[error("failed to write upload file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read upload file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove upload file: {0}")]
    FileRemove(std::io::Error),
}

impl EraError {
    /// Whether this error is the caller's fault and should be reported as a bad request.
    pub fn is_validation(&self) -> bool {
        matches!(self, EraError::Validation(_))
    }
}

pub type EraResult<T> = std::result::Result<T, EraError>;
