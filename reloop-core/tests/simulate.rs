use reloop_core::{Cmd, ListOptions, RunArg, RunError, RunOptions, RunOutput, Simulated, Simulation, TimerHandle};
use serde_json::{json, Value};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

type TestCmd = Cmd<u32, Value>;

fn act(kind: &str) -> Value {
    json!({ "type": kind })
}

/// A RUN that records whether it was ever called.
fn tracked_fetch(called: &Rc<Cell<bool>>) -> TestCmd {
    let called = called.clone();
    TestCmd::run(
        move |_| {
            called.set(true);
            RunOutput::ok("real")
        },
        RunOptions::new()
            .arg(RunArg::value(1))
            .on_success(|value| json!({ "type": "OK", "value": value }))
            .on_fail(|err: RunError| json!({ "type": "FAIL", "reason": err.to_string() })),
    )
}

#[test]
fn run_uses_the_simulated_result_without_calling_func() {
    let called = Rc::new(Cell::new(false));
    let cmd = tracked_fetch(&called);

    assert_eq!(
        cmd.simulate(Some(&Simulation::success(123))),
        Simulated::One(json!({ "type": "OK", "value": 123 }))
    );
    assert_eq!(
        cmd.simulate(Some(&Simulation::failure("offline"))),
        Simulated::One(json!({ "type": "FAIL", "reason": "run failed with \"offline\"" }))
    );
    assert!(!called.get());
}

#[test]
fn run_without_matching_creator_or_outcome_is_nothing() {
    let cmd = TestCmd::run(|_| RunOutput::ok(1), RunOptions::new().on_success(|v| v));
    assert!(cmd.simulate(Some(&Simulation::failure(0))).is_nothing());
    assert!(cmd.simulate(None).is_nothing());
}

#[test]
fn list_simulates_each_command_positionally() {
    let called = Rc::new(Cell::new(false));
    let cmd = TestCmd::list(
        [
            tracked_fetch(&called),
            TestCmd::action(act("A")),
            tracked_fetch(&called),
        ],
        ListOptions::default().sequence(),
    );
    let tree = Simulation::Many(vec![
        Simulation::success(1),
        Simulation::success(Value::Null),
        Simulation::failure("x"),
    ]);
    assert_eq!(
        cmd.simulate(Some(&tree)).into_vec(),
        vec![
            json!({ "type": "OK", "value": 1 }),
            act("A"),
            json!({ "type": "FAIL", "reason": "run failed with \"x\"" }),
        ]
    );
    assert!(!called.get());
}

#[test]
fn list_with_missing_entries_simulates_them_as_absent() {
    let called = Rc::new(Cell::new(false));
    let cmd = TestCmd::batch([TestCmd::action(act("A")), tracked_fetch(&called)]);
    assert_eq!(cmd.simulate(None), Simulated::Many(vec![act("A")]));
    assert!(TestCmd::batch([TestCmd::none()]).simulate(None).is_nothing());
}

#[test]
fn map_tags_simulated_actions() {
    let called = Rc::new(Cell::new(false));
    let cmd = TestCmd::map_with(
        TestCmd::batch([tracked_fetch(&called), TestCmd::action(act("A"))]),
        |args: &[Value], inner: Value| json!({ "type": "ROW", "id": args[0], "inner": inner }),
        vec![json!(3)],
    );
    let tree = Simulation::Many(vec![Simulation::success(9)]);
    assert_eq!(
        cmd.simulate(Some(&tree)),
        Simulated::Many(vec![
            json!({ "type": "ROW", "id": 3, "inner": { "type": "OK", "value": 9 } }),
            json!({ "type": "ROW", "id": 3, "inner": act("A") }),
        ])
    );
}

#[test]
fn scheduled_reports_handle_then_nested_actions() {
    let called = Rc::new(Cell::new(false));
    let cmd = TestCmd::schedule(
        tracked_fetch(&called),
        Duration::from_millis(50),
        Some(Rc::new(|handle: TimerHandle| {
            json!({ "type": "SCHEDULED", "handle": handle })
        })),
    );
    let tree = Simulation::Scheduled {
        handle: TimerHandle(7),
        nested: Some(Box::new(Simulation::success("later"))),
    };
    assert_eq!(
        cmd.simulate(Some(&tree)).into_vec(),
        vec![
            json!({ "type": "SCHEDULED", "handle": 7 }),
            json!({ "type": "OK", "value": "later" }),
        ]
    );
    assert!(!called.get());
}

#[test]
fn scheduled_without_handle_entry_uses_default_handle() {
    let cmd = TestCmd::schedule(
        TestCmd::action(act("LATER")),
        Duration::from_millis(5),
        Some(Rc::new(|handle: TimerHandle| {
            json!({ "type": "SCHEDULED", "handle": handle })
        })),
    );
    assert_eq!(
        cmd.simulate(None).into_vec(),
        vec![json!({ "type": "SCHEDULED", "handle": 0 }), act("LATER")]
    );

    let silent = TestCmd::schedule(TestCmd::action(act("LATER")), Duration::from_millis(5), None);
    assert_eq!(silent.simulate(None), Simulated::One(act("LATER")));
}

#[test]
fn simulation_trees_load_from_json_fixtures() {
    let tree: Simulation = serde_json::from_str(
        r#"[{ "result": 1, "success": true }, { "result": "nope", "success": false }]"#,
    )
    .unwrap();
    let called = Rc::new(Cell::new(false));
    let cmd = TestCmd::batch([tracked_fetch(&called), tracked_fetch(&called)]);
    assert_eq!(
        cmd.simulate(Some(&tree)).into_vec(),
        vec![
            json!({ "type": "OK", "value": 1 }),
            json!({ "type": "FAIL", "reason": "run failed with \"nope\"" }),
        ]
    );
}
