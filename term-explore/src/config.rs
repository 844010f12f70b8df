//! Configuration for a single analysis run.
//!
//! Everything the pipeline needs is built once at process start and passed
//! down by reference. The only value read from the environment is the bearer
//! token for the narrative service.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, TermError};
use crate::sources::CsvOptions;

/// Environment variable holding the narrative service credential.
pub const TOKEN_ENV_VAR: &str = "AIPROXY_TOKEN";

/// Default chat-completions endpoint for the narrative service.
pub const DEFAULT_ENDPOINT: &str = "https://aiproxy.sanand.workers.dev/openai/v1/chat/completions";

/// Default model identifier sent with narrative requests.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A bearer credential that clears its contents when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct ApiToken(String);

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiToken(***)")
    }
}

impl ApiToken {
    /// Wraps a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the token value. Use carefully and avoid storing the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Convert to a regular string. The token will be zeroized.
    pub fn into_string(mut self) -> String {
        let value = std::mem::take(&mut self.0);
        self.0.zeroize();
        value
    }
}

impl From<&str> for ApiToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Settings for the narrative-generation collaborator.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    token: ApiToken,
}

impl NarrativeConfig {
    /// Creates a configuration with the default endpoint and sampling settings.
    pub fn new(token: impl Into<ApiToken>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            token: token.into(),
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is honored when present. A
    /// missing or blank `AIPROXY_TOKEN` is a fatal configuration error.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded environment file");
        }

        let token = std::env::var(TOKEN_ENV_VAR).unwrap_or_default();
        Self::from_token_value(&token)
    }

    fn from_token_value(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TermError::configuration(format!(
                "{TOKEN_ENV_VAR} not found in the environment or .env file"
            )));
        }
        Ok(Self::new(ApiToken::new(token)))
    }

    /// Sets the chat-completions endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn token(&self) -> &ApiToken {
        &self.token
    }
}

/// Parameters of the analytical stages.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Neighborhood radius for density clustering, in standardized units.
    pub dbscan_eps: f64,
    /// Minimum neighborhood size (including the point itself) for a core point.
    pub dbscan_min_samples: usize,
    /// Largest row count accepted by hierarchical clustering.
    pub max_hierarchical_rows: usize,
    /// Encoding used when detection is indeterminate.
    pub default_encoding: &'static Encoding,
    /// Options for parsing the delimited input.
    pub csv: CsvOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dbscan_eps: 0.5,
            dbscan_min_samples: 5,
            max_hierarchical_rows: 5000,
            default_encoding: encoding_rs::UTF_8,
            csv: CsvOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Sets the density clustering parameters.
    pub fn with_dbscan(mut self, eps: f64, min_samples: usize) -> Self {
        self.dbscan_eps = eps;
        self.dbscan_min_samples = min_samples;
        self
    }

    /// Sets the hierarchical clustering row limit.
    pub fn with_max_hierarchical_rows(mut self, rows: usize) -> Self {
        self.max_hierarchical_rows = rows;
        self
    }

    /// Sets the encoding used when detection is indeterminate.
    pub fn with_default_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    /// Sets the CSV parsing options.
    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }
}

/// Settings for rendered artifacts.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Directory receiving the image files.
    pub output_dir: PathBuf,
    /// Image size in pixels.
    pub size: (u32, u32),
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            size: (1000, 800),
        }
    }
}

impl RenderConfig {
    /// Fixed file extension of every rendered artifact.
    pub const EXTENSION: &'static str = "svg";

    /// Returns the deterministic path for an artifact's logical name.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.{}", Self::EXTENSION))
    }
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
    /// File name of the final report, relative to the output directory.
    pub report_file_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            render: RenderConfig::default(),
            report_file_name: "README.md".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Writes every output (images and report) under `dir`.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.render.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the analysis parameters.
    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.render.output_dir
    }

    /// Full path of the report file.
    pub fn report_path(&self) -> PathBuf {
        self.render.output_dir.join(&self.report_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_token_debug_is_redacted() {
        let token = ApiToken::new("sk-secret");
        assert_eq!(format!("{token:?}"), "ApiToken(***)");
        assert_eq!(token.expose(), "sk-secret");
    }

    #[test]
    fn test_blank_token_is_rejected() {
        let err = NarrativeConfig::from_token_value("   ").unwrap_err();
        assert!(matches!(err, TermError::Configuration(_)));
        assert!(err.to_string().contains(TOKEN_ENV_VAR));
    }

    #[test]
    fn test_narrative_defaults() {
        let config = NarrativeConfig::from_token_value("abc").unwrap();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.max_tokens(), 2000);
        assert!((config.temperature() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_narrative_builder() {
        let config = NarrativeConfig::new("abc")
            .with_endpoint("http://localhost:9999/v1/chat")
            .with_model("small")
            .with_max_tokens(10)
            .with_temperature(0.0);
        assert_eq!(config.endpoint(), "http://localhost:9999/v1/chat");
        assert_eq!(config.model(), "small");
        assert_eq!(config.max_tokens(), 10);
    }

    #[test]
    fn test_analysis_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.dbscan_eps, 0.5);
        assert_eq!(config.dbscan_min_samples, 5);
        assert_eq!(config.default_encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_artifact_paths_are_deterministic() {
        let config = PipelineConfig::default().with_output_dir("/tmp/out");
        assert_eq!(
            config.render.artifact_path("correlation_matrix"),
            PathBuf::from("/tmp/out/correlation_matrix.svg")
        );
        assert_eq!(config.report_path(), PathBuf::from("/tmp/out/README.md"));
    }
}
