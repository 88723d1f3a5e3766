use std::env;
use std::path::PathBuf;

pub const DEFAULT_TABLE_NAME: &str = "Forum";
pub const DEFAULT_SAMPLE_FILE: &str = "./sampledata/Forum.json";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Settings for the demo, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// FORUM_TABLE_NAME
    pub table_name: String,
    /// FORUM_SAMPLE_FILE
    pub sample_file: PathBuf,
    /// AWS_ENDPOINT_URL, set to e.g. http://localhost:8000 for dynamodb-local.
    pub endpoint_url: Option<String>,
    /// AWS_REGION
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            sample_file: PathBuf::from(DEFAULT_SAMPLE_FILE),
            endpoint_url: None,
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            table_name: non_empty("FORUM_TABLE_NAME").unwrap_or(defaults.table_name),
            sample_file: non_empty("FORUM_SAMPLE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.sample_file),
            endpoint_url: non_empty("AWS_ENDPOINT_URL"),
            region: non_empty("AWS_REGION").unwrap_or(defaults.region),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.target_display(), "AWS DynamoDB (region: us-east-1)");
    }

    #[test]
    fn reads_overrides() {
        let vars = HashMap::from([
            ("FORUM_TABLE_NAME", "Threads"),
            ("FORUM_SAMPLE_FILE", "/tmp/forums.json"),
            ("AWS_ENDPOINT_URL", "http://localhost:8000"),
            ("AWS_REGION", ""),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.table_name, "Threads");
        assert_eq!(config.sample_file, PathBuf::from("/tmp/forums.json"));
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(
            config.target_display(),
            "Local DynamoDB (http://localhost:8000)"
        );
    }
}
