pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(
        "invalid animation durations: image {image}s (±{image_deviation}s) must outlast half of the transition {transition}s (±{transition_deviation}s)"
    )]
    InvalidDurations {
        image: f64,
        image_deviation: f64,
        transition: f64,
        transition_deviation: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("image source returned no first image")]
    NoFirstImage,

    #[error("face recognition mode '{0}' requires a face detector")]
    MissingFaceDetector(&'static str),

    #[error("face recognition mode '{0}' has no face selection")]
    UnsupportedFaceMode(&'static str),

    #[error("computation latency {latency:.3}s exceeds animation duration {duration:.3}s")]
    LatencyExceedsDuration { latency: f64, duration: f64 },

    #[error("failed to build background thread pool: {0}")]
    ThreadPool(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Errors that `start()` reports before touching any collaborator.
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidDurations { .. }
                | Error::InvalidConfig(_)
                | Error::NoFirstImage
                | Error::MissingFaceDetector(_)
                | Error::UnsupportedFaceMode(_)
        )
    }
}
