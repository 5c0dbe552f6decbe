//! Mounting and structural reconciliation

use fibra_core::{children, create_element, tag, text_element, Component, Element, Hooks, Props};

use crate::runner::TestSuite;

fn list(items: &[&str]) -> Element {
    tag("ul")
        .children(items.iter().map(|item| tag("li").child(*item)))
        .build()
}

fn heading(props: &Props, _hooks: &mut Hooks<'_>) -> Element {
    let title = props
        .get("title")
        .map(|value| value.to_string())
        .unwrap_or_default();
    tag("h1").child(title).build()
}

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("mount");

    suite.add("nested_tree", |ctx| {
        ctx.render(
            tag("div")
                .prop("id", "app")
                .child(tag("span").child("hello"))
                .child(" world"),
        );
        ctx.expect_html(r#"<div id="app"><span>hello</span> world</div>"#)
    });

    suite.add("text_root", |ctx| {
        ctx.render(text_element(42));
        ctx.expect_text("42")
    });

    suite.add("rerender_reconciles", |ctx| {
        ctx.render(list(&["a", "b"]));
        let ul = ctx.find("ul")?;

        ctx.render(list(&["a", "b", "c"]));
        ctx.expect(ctx.find("ul")? == ul, "<ul> was recreated")?;
        ctx.expect_html("<ul><li>a</li><li>b</li><li>c</li></ul>")?;

        ctx.render(list(&["c"]));
        ctx.expect_html("<ul><li>c</li></ul>")
    });

    suite.add("type_change_replaces", |ctx| {
        ctx.render(tag("div").child(tag("p").child("x")));
        ctx.render(tag("div").child(tag("section").child("x")));
        ctx.expect_html("<div><section>x</section></div>")?;
        ctx.expect(ctx.stats().nodes_removed >= 1, "old <p> not removed")
    });

    suite.add("component_among_siblings", |ctx| {
        let heading = Component::new("Heading", heading);
        let view = |title: &str| {
            tag("main")
                .child(tag("nav"))
                .child(create_element(
                    heading.clone(),
                    fibra_core::props! { "title" => title },
                    children![],
                ))
                .child(tag("footer"))
                .build()
        };

        ctx.render(view("one"));
        ctx.expect_html("<main><nav></nav><h1>one</h1><footer></footer></main>")?;
        ctx.render(view("two"));
        ctx.expect_html("<main><nav></nav><h1>two</h1><footer></footer></main>")
    });

    suite.add("unmount_clears_container", |ctx| {
        ctx.render(list(&["a"]));
        ctx.expect(ctx.renderer().unmount(&ctx.root()), "nothing to unmount")?;
        ctx.expect_html("")?;
        ctx.expect(ctx.renderer().fiber_count() == 0, "fibers left behind")
    });

    suite
}
