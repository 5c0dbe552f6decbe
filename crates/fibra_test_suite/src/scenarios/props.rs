//! Property and listener diffing

use std::cell::Cell;
use std::rc::Rc;

use fibra_core::{tag, EventHandler, PropValue};

use crate::runner::TestSuite;

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("props");

    suite.add("props_applied", |ctx| {
        ctx.render(tag("input").prop("value", "hi").prop("tabIndex", 2).prop("disabled", true));
        let input = ctx.find("input")?;
        ctx.expect(
            ctx.doc().property(input, "tabIndex") == Some(PropValue::Number(2.0)),
            "tabIndex not set",
        )?;
        ctx.expect_html(r#"<input value="hi" tabIndex="2" disabled="true"></input>"#)
    });

    suite.add("removed_prop_cleared", |ctx| {
        ctx.render(tag("p").prop("title", "a").prop("lang", "en"));
        ctx.render(tag("p").prop("lang", "fr"));
        let p = ctx.find("p")?;
        ctx.expect(ctx.doc().property(p, "title").is_none(), "title left behind")?;
        ctx.expect_html(r#"<p lang="fr"></p>"#)
    });

    suite.add("same_props_no_mutations", |ctx| {
        let view = || tag("p").prop("title", "a").child("x");
        ctx.render(view());
        let before = ctx.doc().mutation_count();
        ctx.render(view());
        ctx.expect(
            ctx.doc().mutation_count() == before,
            "identical rerender mutated the document",
        )
    });

    suite.add("listener_swapped", |ctx| {
        let hits = Rc::new(Cell::new(0u32));
        let first = {
            let hits = hits.clone();
            EventHandler::new(move |_| hits.set(hits.get() + 1))
        };
        let second = {
            let hits = hits.clone();
            EventHandler::new(move |_| hits.set(hits.get() + 10))
        };

        ctx.render(tag("button").on("click", first));
        ctx.click("button")?;
        ctx.render(tag("button").on("click", second));
        ctx.click("button")?;

        let button = ctx.find("button")?;
        ctx.expect(ctx.doc().listener_count(button, "click") == 1, "stale listener")?;
        ctx.expect(hits.get() == 11, "wrong handler fired")
    });

    suite.add("listener_removed", |ctx| {
        ctx.render(tag("button").on("click", EventHandler::new(|_| {})));
        ctx.render(tag("button"));
        let button = ctx.find("button")?;
        ctx.expect(ctx.doc().listener_count(button, "click") == 0, "listener kept")
    });

    suite
}
