use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("bad cadence".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad cadence"));
    }

    #[test]
    fn test_error_from_toml() {
        let parse = toml::from_str::<toml::Value>("key = ").unwrap_err();
        let err: Error = parse.into();
        match err {
            Error::Deserialization(_) => {}
            _ => panic!("Expected Deserialization error"),
        }
    }
}
