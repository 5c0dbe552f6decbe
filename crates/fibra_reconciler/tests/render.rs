//! Render passes against the in-memory document

use fibra_dom::{Document, NodeId};
use fibra_reconciler::{
    children, create_element, props, tag, Component, Element, EventHandler, FiberKind, Hooks,
    Props, RendererConfig, Renderer,
};

fn setup() -> (Document, NodeId, Renderer<Document>) {
    let doc = Document::new();
    let root = doc.create_container();
    let renderer = Renderer::new(doc.clone());
    (doc, root, renderer)
}

fn list(items: &[&str]) -> Element {
    tag("ul")
        .children(items.iter().map(|item| tag("li").child(*item)))
        .build()
}

#[test]
fn test_renders_nested_tree() {
    let (doc, root, renderer) = setup();

    renderer.render(
        create_element(
            "div",
            props! { "id" => "x" },
            children![create_element("span", None, children!["hi"])],
        ),
        Some(&root),
    );

    assert_eq!(doc.to_html(root), r#"<div id="x"><span>hi</span></div>"#);
    assert_eq!(renderer.root_count(), 1);
    assert_eq!(renderer.fiber_count(), 3);
    assert_eq!(renderer.stats().nodes_created, 3);
}

#[test]
fn test_missing_container_is_noop() {
    let (doc, _root, renderer) = setup();
    renderer.render(tag("div"), None);

    assert_eq!(renderer.root_count(), 0);
    assert_eq!(renderer.stats().passes, 0);
    assert_eq!(doc.node_count(), 1);
}

#[test]
fn test_rerender_reconciles_instead_of_appending() {
    let (doc, root, renderer) = setup();

    renderer.render(list(&["a", "b"]), Some(&root));
    let ul = doc.find_by_tag(root, "ul").unwrap();

    renderer.render(list(&["a", "c"]), Some(&root));

    assert_eq!(doc.children(root), vec![ul]);
    assert_eq!(doc.to_html(root), "<ul><li>a</li><li>c</li></ul>");
    assert_eq!(renderer.root_count(), 1);
    assert_eq!(renderer.stats().nodes_created, 5);
}

#[test]
fn test_identical_props_issue_no_mutations() {
    let (doc, root, renderer) = setup();
    let view = || {
        create_element(
            "div",
            props! { "id" => "x", "tabIndex" => 1 },
            children![tag("span").child("hi")],
        )
    };

    renderer.render(view(), Some(&root));
    let before = doc.mutation_count();

    renderer.render(view(), Some(&root));
    assert_eq!(doc.mutation_count(), before);
}

#[test]
fn test_removed_props_are_cleared() {
    let (doc, root, renderer) = setup();
    let handler = EventHandler::new(|_| {});

    renderer.render(
        tag("div")
            .prop("id", "x")
            .prop("title", "t")
            .on("click", handler),
        Some(&root),
    );
    let div = doc.find_by_tag(root, "div").unwrap();
    assert_eq!(doc.listener_count(div, "click"), 1);

    renderer.render(tag("div").prop("id", "y"), Some(&root));

    assert_eq!(doc.find_by_tag(root, "div"), Some(div));
    assert_eq!(doc.property(div, "title"), None);
    assert_eq!(doc.property(div, "id").unwrap().to_string(), "y");
    assert_eq!(doc.listener_count(div, "click"), 0);
}

#[test]
fn test_children_order_preserved() {
    let (doc, root, renderer) = setup();
    renderer.render(list(&["1", "2", "3"]), Some(&root));

    assert_eq!(doc.text_content(root), "123");

    let snapshot = renderer.snapshot(&root).unwrap();
    let texts: Vec<FiberKind> = snapshot
        .children
        .iter()
        .map(|li| li.children[0].kind.clone())
        .collect();
    assert_eq!(
        texts,
        vec![
            FiberKind::Text("1".into()),
            FiberKind::Text("2".into()),
            FiberKind::Text("3".into()),
        ]
    );
}

#[test]
fn test_positional_replacement_keeps_order() {
    let (doc, root, renderer) = setup();

    renderer.render(
        tag("div")
            .child(tag("span").child("a"))
            .child(tag("p").child("b"))
            .child(tag("span").child("c")),
        Some(&root),
    );
    let div = doc.find_by_tag(root, "div").unwrap();
    let first = doc.children(div)[0];
    let last = doc.children(div)[2];

    renderer.render(
        tag("div")
            .child(tag("span").child("a"))
            .child(tag("em").child("b"))
            .child(tag("span").child("c")),
        Some(&root),
    );

    assert_eq!(
        doc.to_html(root),
        "<div><span>a</span><em>b</em><span>c</span></div>"
    );
    let children = doc.children(div);
    assert_eq!(children[0], first);
    assert_eq!(children[2], last);
    assert_eq!(renderer.stats().nodes_removed, 1);
}

#[test]
fn test_shrinking_and_growing_children() {
    let (doc, root, renderer) = setup();

    renderer.render(list(&["a", "b", "c"]), Some(&root));
    renderer.render(list(&["a"]), Some(&root));
    assert_eq!(doc.text_content(root), "a");

    renderer.render(list(&["a", "x", "y"]), Some(&root));
    assert_eq!(doc.text_content(root), "axy");
    assert_eq!(renderer.fiber_count(), 7);
}

#[test]
fn test_text_swapped_for_element() {
    let (doc, root, renderer) = setup();

    renderer.render(tag("p").child("plain").child("!"), Some(&root));
    renderer.render(
        tag("p").child(tag("b").child("bold")).child("!"),
        Some(&root),
    );

    assert_eq!(doc.to_html(root), "<p><b>bold</b>!</p>");
}

fn wrapper(props: &Props, _hooks: &mut Hooks<'_>) -> Element {
    let label = props.get("label").map(|v| v.to_string()).unwrap_or_default();
    tag("section").child(label).build()
}

#[test]
fn test_component_output_positioned_among_siblings() {
    let (doc, root, renderer) = setup();
    let component = Component::new("Wrapper", wrapper);

    let view = |show_component: bool| {
        let middle = if show_component {
            create_element(component.clone(), props! { "label" => "mid" }, children![])
        } else {
            tag("hr").build()
        };
        tag("main").child("a").child(middle).child("z").build()
    };

    renderer.render(view(false), Some(&root));
    renderer.render(view(true), Some(&root));
    assert_eq!(doc.to_html(root), "<main>a<section>mid</section>z</main>");

    renderer.render(view(false), Some(&root));
    assert_eq!(doc.to_html(root), "<main>a<hr></hr>z</main>");
}

#[test]
fn test_root_type_change() {
    let (doc, root, renderer) = setup();

    renderer.render(tag("div").child("one"), Some(&root));
    renderer.render(tag("span").child("two"), Some(&root));

    assert_eq!(doc.to_html(root), "<span>two</span>");
    assert_eq!(renderer.root_count(), 1);
    assert_eq!(renderer.fiber_count(), 2);
}

#[test]
fn test_multiple_containers() {
    let (doc, left, renderer) = setup();
    let right = doc.create_container();

    renderer.render(tag("b").child("L"), Some(&left));
    renderer.render(tag("i").child("R"), Some(&right));
    assert_eq!(renderer.root_count(), 2);

    assert!(renderer.unmount(&left));
    assert!(!renderer.unmount(&left));
    assert_eq!(doc.to_html(left), "");
    assert_eq!(doc.to_html(right), "<i>R</i>");
    assert_eq!(renderer.root_count(), 1);
}

#[test]
fn test_attach_failure_is_counted() {
    let doc = Document::new();
    let renderer = Renderer::new(doc.clone());
    let text = fibra_reconciler::Host::create_text_node(&doc, "leaf");

    renderer.render(tag("div"), Some(&text));

    assert_eq!(renderer.stats().attach_failures, 1);
    assert_eq!(renderer.root_count(), 1);
}

#[test]
fn test_custom_event_prefix() {
    let doc = Document::new();
    let root = doc.create_container();
    let config = RendererConfig::standard().with_event_prefix("handle");
    let renderer = Renderer::with_config(doc.clone(), config).unwrap();

    renderer.render(
        tag("input")
            .prop("handleInput", EventHandler::new(|_| {}))
            .prop("onInput", "kept as a property"),
        Some(&root),
    );

    let input = doc.find_by_tag(root, "input").unwrap();
    assert_eq!(doc.listener_count(input, "input"), 1);
    assert!(doc.property(input, "onInput").is_some());
}

#[test]
fn test_invalid_config_rejected() {
    let config = RendererConfig::standard().with_max_update_depth(0);
    assert!(Renderer::with_config(Document::new(), config).is_err());
}

#[test]
fn test_rebuild_mode_replaces_host_nodes() {
    let doc = Document::new();
    let root = doc.create_container();
    let renderer = Renderer::with_config(doc.clone(), RendererConfig::rebuild()).unwrap();

    renderer.render(tag("div").child("a"), Some(&root));
    let first = doc.find_by_tag(root, "div").unwrap();

    renderer.render(tag("div").child("a"), Some(&root));
    let second = doc.find_by_tag(root, "div").unwrap();

    assert_ne!(first, second);
    assert!(!doc.contains(first));
    assert_eq!(doc.to_html(root), "<div>a</div>");
    assert_eq!(renderer.stats().nodes_reused, 0);
}
