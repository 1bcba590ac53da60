use crate::error::ExportError;
use argonath_core::config::ExportConfig;
use argonath_core::model::GraphSnapshot;
use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const INDEX_HTML: &str = "index.html";
pub const STYLES_CSS: &str = "styles.css";
pub const SCRIPT_JS: &str = "script.js";

const STYLESHEET_LINK: &str = r#"<link rel="stylesheet" href="styles.css">"#;
const SCRIPT_TAG: &str = r#"<script src="script.js"></script>"#;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {name} unavailable: {reason}")]
    Unavailable { name: String, reason: String },
    #[error("template {name} is missing the {marker} marker")]
    MissingMarker { name: String, marker: String },
}

/// Where the three static viewer assets come from.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<String, TemplateError>;
}

pub struct FsTemplateSource {
    dir: PathBuf,
}

impl FsTemplateSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Reads from `export.template_dir`.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.template_dir)
    }
}

#[async_trait]
impl TemplateSource for FsTemplateSource {
    async fn fetch(&self, name: &str) -> Result<String, TemplateError> {
        tokio::fs::read_to_string(self.dir.join(name))
            .await
            .map_err(|err| TemplateError::Unavailable {
                name: name.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Templates compiled into the binary from `templates/static-viewer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplateSource;

#[async_trait]
impl TemplateSource for EmbeddedTemplateSource {
    async fn fetch(&self, name: &str) -> Result<String, TemplateError> {
        let body = match name {
            INDEX_HTML => include_str!("../../templates/static-viewer/index.html"),
            STYLES_CSS => include_str!("../../templates/static-viewer/styles.css"),
            SCRIPT_JS => include_str!("../../templates/static-viewer/script.js"),
            other => {
                return Err(TemplateError::Unavailable {
                    name: other.to_string(),
                    reason: "no embedded template".to_string(),
                })
            }
        };
        Ok(body.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub index_html: String,
    pub styles_css: String,
    pub script_js: String,
}

/// Fetches all three assets; one failure aborts the whole export.
pub async fn fetch_templates(source: &dyn TemplateSource) -> Result<TemplateSet, TemplateError> {
    let result = tokio::try_join!(
        source.fetch(INDEX_HTML),
        source.fetch(STYLES_CSS),
        source.fetch(SCRIPT_JS)
    );
    match result {
        Ok((index_html, styles_css, script_js)) => Ok(TemplateSet {
            index_html,
            styles_css,
            script_js,
        }),
        Err(err) => {
            error!("static viewer template fetch failed: {}", err);
            Err(err)
        }
    }
}

/// Substitutes the snapshot JSON for `placeholder` inside the page.
///
/// `</` is written as `<\/` so the payload cannot close its `<script>` element.
pub fn embed_payload(
    html: &str,
    placeholder: &str,
    snapshot: &GraphSnapshot,
) -> Result<String, ExportError> {
    if !html.contains(placeholder) {
        return Err(TemplateError::MissingMarker {
            name: INDEX_HTML.to_string(),
            marker: placeholder.to_string(),
        }
        .into());
    }
    let json = serde_json::to_string_pretty(snapshot)?.replace("</", "<\\/");
    Ok(html.replacen(placeholder, &json, 1))
}

pub fn build_static_bundle(
    templates: &TemplateSet,
    placeholder: &str,
    snapshot: &GraphSnapshot,
) -> Result<Vec<u8>, ExportError> {
    let index_html = embed_payload(&templates.index_html, placeholder, snapshot)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in [
        (INDEX_HTML, index_html.as_str()),
        (STYLES_CSS, templates.styles_css.as_str()),
        (SCRIPT_JS, templates.script_js.as_str()),
    ] {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(name, options)?;
        writer.write_all(body.as_bytes())?;
    }
    let bytes = writer.finish()?.into_inner();

    info!(
        nodes = snapshot.nodes.len(),
        edges = snapshot.edges.len(),
        size = bytes.len(),
        "static viewer bundle built"
    );
    Ok(bytes)
}

/// Single-file variant: stylesheet and script are inlined into the page.
pub fn build_standalone_html(
    templates: &TemplateSet,
    placeholder: &str,
    snapshot: &GraphSnapshot,
) -> Result<String, ExportError> {
    let html = embed_payload(&templates.index_html, placeholder, snapshot)?;
    for marker in [STYLESHEET_LINK, SCRIPT_TAG] {
        if !html.contains(marker) {
            return Err(TemplateError::MissingMarker {
                name: INDEX_HTML.to_string(),
                marker: marker.to_string(),
            }
            .into());
        }
    }

    let script = templates.script_js.replace("</script", "<\\/script");
    Ok(html
        .replacen(
            STYLESHEET_LINK,
            &format!("<style>\n{}\n</style>", templates.styles_css),
            1,
        )
        .replacen(SCRIPT_TAG, &format!("<script>\n{}\n</script>", script), 1))
}
