//! Local export formats: JSON file, PNG raster, zipped static viewer and
//! standalone HTML page.

pub mod bundle;
pub mod error;
pub mod image;
pub mod json;

pub use bundle::{
    build_standalone_html, build_static_bundle, embed_payload, fetch_templates,
    EmbeddedTemplateSource, FsTemplateSource, TemplateError, TemplateSet, TemplateSource,
};
pub use error::ExportError;
pub use image::{render_png, ImageOptions};
pub use json::{decode_snapshot, decode_snapshot_value, encode_snapshot};
