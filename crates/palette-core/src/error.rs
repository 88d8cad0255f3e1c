use thiserror::Error;

/// Errors raised while turning an image into a palette.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The image could not be fetched or decoded. Never retried.
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A configured or submitted color is not `#rrggbb`.
    #[error("Invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },
}

impl ExtractError {
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn image_load_msg(message: impl Into<String>) -> Self {
        Self::ImageLoad {
            message: message.into(),
            source: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    #[error("Invalid attempt date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}
