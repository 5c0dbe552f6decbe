#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use fibra_reconciler::{tag, EventHandler, Host, Renderer};
use fibra_web::WebHost;

wasm_bindgen_test_configure!(run_in_browser);

fn container(host: &WebHost) -> web_sys::Node {
    let div = host.document().create_element("div").unwrap();
    host.document()
        .body()
        .unwrap()
        .append_child(&div)
        .unwrap();
    div.into()
}

#[wasm_bindgen_test]
fn renders_into_document() {
    let host = WebHost::from_window().unwrap();
    let root = container(&host);
    let renderer = Renderer::new(host);

    renderer.render(tag("p").prop("id", "greeting").child("hello"), Some(&root));

    let element: web_sys::Element = root.clone().dyn_into().unwrap();
    assert_eq!(element.inner_html(), r#"<p id="greeting">hello</p>"#);
}

#[wasm_bindgen_test]
fn listeners_are_bound_and_removed() {
    let host = WebHost::from_window().unwrap();
    let root = container(&host);
    let renderer = Renderer::new(host);

    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    renderer.render(
        tag("button").on("click", EventHandler::new(move |_| h.set(h.get() + 1))),
        Some(&root),
    );
    assert_eq!(renderer.host().listener_count(), 1);

    let button: web_sys::HtmlElement = root.first_child().unwrap().dyn_into().unwrap();
    button.click();
    assert_eq!(hits.get(), 1);

    renderer.render(tag("button"), Some(&root));
    assert_eq!(renderer.host().listener_count(), 0);
    button.click();
    assert_eq!(hits.get(), 1);
}

#[wasm_bindgen_test]
fn invalid_tag_becomes_placeholder() {
    let host = WebHost::from_window().unwrap();
    let node = host.create_element_node("not a tag");
    assert_eq!(node.node_type(), web_sys::Node::COMMENT_NODE);
}

#[wasm_bindgen_test]
fn missing_container_is_reported() {
    let host = WebHost::from_window().unwrap();
    assert!(host.container_by_id("no-such-element").is_err());
}

#[wasm_bindgen_test]
fn unmount_releases_nested_listeners() {
    let host = WebHost::from_window().unwrap();
    let root = container(&host);
    let renderer = Renderer::new(host);

    renderer.render(
        tag("div")
            .on("click", EventHandler::new(|_| {}))
            .child(tag("button").on("click", EventHandler::new(|_| {}))),
        Some(&root),
    );
    assert_eq!(renderer.host().listener_count(), 2);

    assert!(renderer.unmount(&root));
    assert_eq!(renderer.host().listener_count(), 0);
}

#[wasm_bindgen_test]
fn replaced_node_releases_listeners() {
    let host = WebHost::from_window().unwrap();
    let root = container(&host);
    let renderer = Renderer::new(host);

    renderer.render(
        tag("div").child(tag("button").on("click", EventHandler::new(|_| {}))),
        Some(&root),
    );
    renderer.render(tag("div").child(tag("span")), Some(&root));
    assert_eq!(renderer.host().listener_count(), 0);
}
