//! State and effect hooks

use std::cell::RefCell;
use std::rc::Rc;

use fibra_core::{
    children, create_element, tag, text_element, Cleanup, Component, Deps, Element, EventHandler,
    Hooks, Props,
};

use crate::runner::TestSuite;

fn counter(_props: &Props, hooks: &mut Hooks<'_>) -> Element {
    let (count, set_count) = hooks.use_state(0i64);
    tag("button")
        .on("click", EventHandler::new(move |_| set_count.update(|n| n + 1)))
        .child(count)
        .build()
}

fn loader(_props: &Props, hooks: &mut Hooks<'_>) -> Element {
    let (loaded, set_loaded) = hooks.use_state(false);
    hooks.use_effect(
        move || {
            set_loaded.set(true);
            None
        },
        Deps::empty(),
    );
    text_element(if loaded { "ready" } else { "loading" })
}

fn runaway(_props: &Props, hooks: &mut Hooks<'_>) -> Element {
    let (n, set) = hooks.use_state(0u64);
    hooks.use_effect(
        move || {
            set.update(|n| n + 1);
            None
        },
        Deps::always(),
    );
    text_element(n)
}

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("hooks");

    suite.add("counter_clicks", |ctx| {
        let counter = Component::new("Counter", counter);
        ctx.render(create_element(counter, None, children![]));
        ctx.click("button")?;
        ctx.click("button")?;
        ctx.expect_text("2")?;
        ctx.expect(ctx.stats().state_updates == 2, "unexpected update count")
    });

    suite.add("state_per_position", |ctx| {
        let counter = Component::new("Counter", counter);
        let view = || {
            tag("div")
                .child(create_element(counter.clone(), None, children![]))
                .child(create_element(counter.clone(), None, children![]))
                .build()
        };
        ctx.render(view());
        let second = ctx.doc().children(ctx.find("div")?)[1];
        ctx.doc().click(second);

        ctx.render(view());
        ctx.expect_html("<div><button>0</button><button>1</button></div>")
    });

    suite.add("effect_sets_state", |ctx| {
        ctx.render(create_element(Component::new("Loader", loader), None, children![]));
        ctx.expect_text("ready")
    });

    suite.add("effect_cleanup_on_unmount", |ctx| {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let probe_log = log.clone();
        let probe = Component::new("Probe", move |_props: &Props, hooks: &mut Hooks<'_>| {
            let log = probe_log.clone();
            hooks.use_effect(
                move || {
                    log.borrow_mut().push("run");
                    let cleanup: Cleanup = Box::new(move || log.borrow_mut().push("cleanup"));
                    Some(cleanup)
                },
                Deps::empty(),
            );
            tag("i").build()
        });

        ctx.render(create_element(probe.clone(), None, children![]));
        ctx.render(create_element(probe, None, children![]));
        ctx.renderer().unmount(&ctx.root());
        let in_order = *log.borrow() == ["run", "cleanup"];
        ctx.expect(in_order, "effect ran out of order")
    });

    suite.add("runaway_updates_bounded", |ctx| {
        let limit = ctx.renderer().config().max_update_depth as u64;
        ctx.render(create_element(Component::new("Runaway", runaway), None, children![]));
        let stats = ctx.stats();
        ctx.expect(stats.state_updates == limit, "update limit not enforced")?;
        ctx.expect(stats.dropped_updates > 0, "no updates dropped")
    });

    suite
}
