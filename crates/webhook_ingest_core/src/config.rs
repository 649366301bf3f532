use thiserror::Error;

pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";
pub const AWS_REGION_VAR: &str = "AWS_REGION";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
}

/// Process-wide settings resolved once before the runtime loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub bucket: String,
    pub region: String,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bucket = required(&lookup, BUCKET_NAME_VAR)?;
        let region = required(&lookup, AWS_REGION_VAR)?;
        Ok(Self { bucket, region })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}
