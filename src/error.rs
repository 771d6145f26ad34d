use thiserror::Error;

/// Coarse classification of a [`TrackerError`], for callers that only need to
/// know whether to fix their input or retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    UpstreamUnavailable,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("invalid mechanical constraints: {0}")]
    InvalidConstraints(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown demo scenario '{0}'")]
    UnknownScenario(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("could not parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::UpstreamUnavailable(_) | TrackerError::Io(_) => {
                ErrorKind::UpstreamUnavailable
            }
            _ => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
