//! A counter view bound to a store through named actions

use serde_json::json;
use std::sync::Arc;
use zerostore::{connect, get_actions, Actions, Component, Instance, Object, Store, Value};

fn main() {
    println!("=== Counter Example ===\n");

    let store = Store::from_json(json!({ "count": 0, "title": "Counter", "log": [] }))
        .expect("initial state is an object");

    let actions = get_actions(&store, |_| {
        Actions::new()
            .with("add", |state: &Object, args: &[Value]| {
                let count = state["count"].as_i64().unwrap_or(0);
                let by = args.first().and_then(Value::as_i64).unwrap_or(1);
                [("count".to_string(), Value::from(count + by))].into()
            })
            .with("rename", |_: &Object, args: &[Value]| {
                let title = args.first().cloned().unwrap_or_default();
                [("title".to_string(), title)].into()
            })
    });

    // The view only cares about the count
    println!("1. Connecting view");
    let view = Arc::new(Instance::new());
    let connection = connect(view.clone(), &store, |state: &Object| {
        [("count".to_string(), state["count"].clone())].into()
    });
    println!("   props: {}", Value::object(view.props()));

    println!("\n2. Adding to the counter");
    for by in [1, 2, 3] {
        actions.dispatch("add", &[Value::from(by)]).expect("action is bound");
        println!("   add({}) -> count = {}", by, view.get("count").unwrap_or_default());
    }

    println!("\n3. Renaming does not re-render the view");
    let before = view.renders();
    actions
        .dispatch("rename", &[Value::from("Clicks")])
        .expect("action is bound");
    println!("   renders before: {}, after: {}", before, view.renders());

    println!("\n4. Destroying the view");
    view.destroy();
    actions.dispatch("add", &[Value::from(10)]).expect("action is bound");
    println!("   connection: {:?}", connection.state());
    println!(
        "   store count: {}, view count: {}",
        store.get_state()["count"],
        view.get("count").unwrap_or_default()
    );

    println!("\n✓ Example complete!");
}
