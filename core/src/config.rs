use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Distance from the centroid at which new nodes are dropped.
    pub insertion_radius: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1200.0,
            viewport_height: 800.0,
            insertion_radius: 150.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub min_query_len: usize,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            max_results: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `RUST_LOG` still wins over `level` when set.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Which name an overwrite save keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteNamePolicy {
    /// The overwritten record keeps its stored name; the form field is ignored.
    #[default]
    KeepExisting,
    /// The save form's name replaces the stored one.
    UseFormName,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PersistenceConfig {
    pub overwrite_name: OverwriteNamePolicy,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fraction of the output kept free around the fitted graph.
    pub padding: f64,
    pub template_dir: String,
    pub payload_placeholder: String,
    pub json_file_name: String,
    pub image_file_name: String,
    pub bundle_file_name: String,
    pub html_file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_width: 1920,
            image_height: 1080,
            min_zoom: 0.1,
            max_zoom: 2.0,
            padding: 0.1,
            template_dir: "templates/static-viewer".to_string(),
            payload_placeholder: "__MINDMAP_DATA__".to_string(),
            json_file_name: "mindmap.json".to_string(),
            image_file_name: "mindmap.png".to_string(),
            bundle_file_name: "mindmap-viewer.zip".to_string(),
            html_file_name: "mindmap.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Image,
    StaticSite,
    Html,
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Message(format!("export: {message}")));

        if self.image_width == 0 || self.image_height == 0 {
            return invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.image_width, self.image_height
            ));
        }
        for (key, value) in [("min_zoom", self.min_zoom), ("max_zoom", self.max_zoom)] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{key} must be a positive number, got {value}"));
            }
        }
        if self.min_zoom > self.max_zoom {
            return invalid(format!(
                "min_zoom {} is greater than max_zoom {}",
                self.min_zoom, self.max_zoom
            ));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return invalid(format!("padding must be >= 0, got {}", self.padding));
        }
        Ok(())
    }

    /// Suggested download name for an export.
    pub fn file_name(&self, format: ExportFormat) -> &str {
        match format {
            ExportFormat::Json => &self.json_file_name,
            ExportFormat::Image => &self.image_file_name,
            ExportFormat::StaticSite => &self.bundle_file_name,
            ExportFormat::Html => &self.html_file_name,
        }
    }
}

/// Flows and export formats enabled for a session.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureConfig {
    pub profile_search: bool,
    pub json_export: bool,
    pub image_export: bool,
    pub static_site_export: bool,
    pub html_export: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            profile_search: true,
            json_export: true,
            image_export: true,
            static_site_export: true,
            html_export: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub editor: EditorConfig,
    pub search: SearchConfig,
    pub persistence: PersistenceConfig,
    pub export: ExportConfig,
    pub features: FeatureConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("ARGONATH").separator("__"));

        let config: Self = builder.build()?.try_deserialize()?;
        config.export.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.export.validate()?;
        Ok(config)
    }
}
