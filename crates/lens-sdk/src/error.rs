use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata error: {0}")]
    Metadata(#[from] lens_metadata::MetadataError),

    #[error("discovery failed: {0}")]
    Graph(#[from] lens_graph::GraphError),

    #[error("measurement error: {0}")]
    Measure(#[from] lens_measure::MeasureError),

    #[error("action sequence failed: {0}")]
    Sequence(#[from] lens_sequence::SequenceError),

    #[error("diff failed: {0}")]
    Diff(#[from] lens_diff::DiffError),
}

pub type SdkResult<T> = Result<T, SdkError>;
