use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropCareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid rule source: {0}")]
    InvalidRuleSource(String),

    #[error("Missing range for {crop}/{stage}/{feature}")]
    MissingRange {
        crop: String,
        stage: String,
        feature: String,
    },

    #[error("Range for {crop}/{stage}/{feature} is not numeric")]
    NonNumericRange {
        crop: String,
        stage: String,
        feature: String,
    },

    #[error("Suitability model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Malformed model artifact: {0}")]
    MalformedModel(String),

    #[error("No training rows were generated from the rule source")]
    EmptyDataset,

    #[error("Training failed: {0}")]
    Training(String),
}

pub type Result<T> = std::result::Result<T, CropCareError>;
