use argonath_core::model::{Edge, EdgeStrength, GraphSnapshot, Node, Position};
use export::{build_standalone_html, embed_payload, fetch_templates, EmbeddedTemplateSource};
use viewer::{StaticViewer, ViewerState};

fn snapshot() -> GraphSnapshot {
    let a = Node::custom(
        "A",
        Some("uses </script> in notes".to_string()),
        Position::new(-100.0, 40.0),
    );
    let b = Node::custom("B", None, Position::new(300.0, 40.0));
    let edge = Edge::new(&a.id, &b.id, EdgeStrength::Weak, None);
    GraphSnapshot::new(vec![a, b], vec![edge])
}

#[tokio::test]
async fn reads_graph_from_exported_index_page() {
    let templates = fetch_templates(&EmbeddedTemplateSource).await.unwrap();
    let graph = snapshot();
    let page = embed_payload(&templates.index_html, "__MINDMAP_DATA__", &graph).unwrap();

    let viewer = StaticViewer::from_html(&page);
    assert_eq!(viewer.state(), &ViewerState::Ready);
    assert_eq!(viewer.snapshot(), graph);
}

#[tokio::test]
async fn reads_graph_from_standalone_page() {
    let templates = fetch_templates(&EmbeddedTemplateSource).await.unwrap();
    let page = build_standalone_html(&templates, "__MINDMAP_DATA__", &snapshot()).unwrap();

    let viewer = StaticViewer::from_html(&page);
    assert!(viewer.is_ready());
    assert_eq!(viewer.nodes().len(), 2);
    assert_eq!(viewer.scene().edges.len(), 1);
}

#[tokio::test]
async fn unsubstituted_template_shows_error() {
    let templates = fetch_templates(&EmbeddedTemplateSource).await.unwrap();
    let viewer = StaticViewer::from_html(&templates.index_html);
    assert!(matches!(viewer.state(), ViewerState::Failed { .. }));
}
