use crate::error::ExportError;
use argonath_core::config::ExportConfig;
use argonath_core::model::{GraphSnapshot, NodeKind};
use canvas::{Bounds, Scene, Viewport};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
    pub padding: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl From<&ExportConfig> for ImageOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            width: config.image_width,
            height: config.image_height,
            padding: config.padding,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

const EDGE_COLOR: (u8, u8, u8) = (100, 116, 139);
const PROFILE_FILL: (u8, u8, u8) = (59, 130, 246);
const CUSTOM_FILL: (u8, u8, u8) = (234, 179, 8);
const OUTLINE: (u8, u8, u8) = (30, 41, 59);

fn paint(rgb: (u8, u8, u8)) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb.0, rgb.1, rgb.2, 255);
    paint.anti_alias = true;
    paint
}

/// Rasterizes the graph to a fixed-size PNG, fitted to the node bounds.
///
/// Labels and profile pictures are not drawn; nodes are coloured by kind.
pub fn render_png(snapshot: &GraphSnapshot, options: &ImageOptions) -> Result<Vec<u8>, ExportError> {
    let mut pixmap = Pixmap::new(options.width, options.height).ok_or_else(|| {
        ExportError::Image(format!(
            "failed to allocate {}x{} surface",
            options.width, options.height
        ))
    })?;
    pixmap.fill(Color::WHITE);

    let viewport = Bounds::of_nodes(&snapshot.nodes)
        .map(|bounds| {
            Viewport::fit(
                &bounds,
                f64::from(options.width),
                f64::from(options.height),
                options.padding,
                options.min_zoom,
                options.max_zoom,
            )
        })
        .unwrap_or_default();
    let scene = Scene::build(&snapshot.nodes, &snapshot.edges, &viewport, None, None);

    let edge_paint = paint(EDGE_COLOR);
    for line in &scene.edges {
        let mut builder = PathBuilder::new();
        builder.move_to(line.from.x as f32, line.from.y as f32);
        builder.line_to(line.to.x as f32, line.to.y as f32);
        let Some(path) = builder.finish() else {
            continue;
        };
        let stroke = Stroke {
            width: line.width as f32,
            dash: line
                .dash
                .and_then(|[on, off]| StrokeDash::new(vec![on as f32, off as f32], 0.0)),
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &edge_paint, &stroke, Transform::identity(), None);
    }

    let outline = paint(OUTLINE);
    let outline_stroke = Stroke {
        width: (1.5 * viewport.zoom) as f32,
        ..Stroke::default()
    };
    for shape in &scene.nodes {
        let Some(circle) = PathBuilder::from_circle(
            shape.center.x as f32,
            shape.center.y as f32,
            shape.radius as f32,
        ) else {
            continue;
        };
        let fill = match shape.kind {
            NodeKind::Profile => paint(PROFILE_FILL),
            NodeKind::Custom => paint(CUSTOM_FILL),
        };
        pixmap.fill_path(&circle, &fill, FillRule::Winding, Transform::identity(), None);
        pixmap.stroke_path(&circle, &outline, &outline_stroke, Transform::identity(), None);
    }

    debug!(
        nodes = scene.nodes.len(),
        edges = scene.edges.len(),
        zoom = viewport.zoom,
        "rasterized mind map"
    );

    pixmap
        .encode_png()
        .map_err(|err| ExportError::Image(format!("failed to encode PNG output: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argonath_core::model::{Edge, EdgeStrength, Node, Position};

    fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn renders_configured_dimensions() {
        let a = Node::custom("A", None, Position::new(-500.0, 0.0));
        let b = Node::custom("B", None, Position::new(800.0, 300.0));
        let edge = Edge::new(&a.id, &b.id, EdgeStrength::Weak, None);
        let snapshot = GraphSnapshot::new(vec![a, b], vec![edge]);

        let options = ImageOptions {
            width: 320,
            height: 200,
            ..ImageOptions::default()
        };
        let png = render_png(&snapshot, &options).unwrap();
        assert_eq!(png_dimensions(&png), (320, 200));
    }

    #[test]
    fn empty_graph_still_produces_png() {
        let png = render_png(&GraphSnapshot::default(), &ImageOptions::default()).unwrap();
        assert_eq!(png_dimensions(&png), (1920, 1080));
    }

    #[test]
    fn zero_sized_surface_is_an_error() {
        let options = ImageOptions {
            width: 0,
            ..ImageOptions::default()
        };
        assert!(matches!(
            render_png(&GraphSnapshot::default(), &options),
            Err(ExportError::Image(_))
        ));
    }
}
