//! Integration tests for the EngineCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use yardplan_engine_lib::command::{execute_json, execute_json_batch};
use yardplan_engine_lib::harness::TestHarness;

#[test]
fn test_command_add_and_inspect() {
    let mut h = TestHarness::new();
    let json = r#"{"command": "add_item", "item": {"id": "s", "type": "model", "asset": "swing", "transform": {"position": [1.0, 0.0, 2.0], "rotation": [0, 0, 0], "scale": [1, 1, 1]}}}"#;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.data.unwrap()["id"], "s");

    execute_json(&mut h, r#"{"command": "tick"}"#).unwrap();
    let data = execute_json(&mut h, r#"{"command": "inspect"}"#)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(data["item_count"], 1);
    assert_eq!(data["items"][0]["type"], "model");
    assert_eq!(data["items"][0]["live"], true);
    assert_eq!(data["mode"]["mode"], "idle");
}

#[test]
fn test_command_rejects_short_floor() {
    let mut h = TestHarness::new();
    let json = r#"{"command": "add_item", "item": {"id": "f", "type": "floor", "points": [{"x": 0, "z": 0}, {"x": 1, "z": 0}]}}"#;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(!resp.success);
    assert_eq!(h.item_count(), 0);
}

#[test]
fn test_command_vertex_workflow_via_batch() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "add_item", "item": {"id": "x", "type": "fence", "points": [{"x": 0, "z": 0}, {"x": 3, "z": 4}], "config": {"preset_id": "ranch"}}},
        {"command": "select_item", "id": "x"},
        {"command": "select_vertex", "index": 0},
        {"command": "select_vertex", "index": 1, "extend": true},
        {"command": "apply_distance", "length": 10.0},
        {"command": "readout"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 6);
    for resp in &responses {
        assert!(resp.success, "Failed: {:?}", resp.error);
    }
    let readout = responses[5].data.as_ref().unwrap();
    assert!((readout["distance"].as_f64().unwrap() - 10.0).abs() < 1e-9);

    let resp = execute_json(&mut h, r#"{"command": "apply_angle", "degrees": 45}"#).unwrap();
    assert!(!resp.success);

    execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
    let readout = execute_json(&mut h, r#"{"command": "readout"}"#).unwrap().data.unwrap();
    assert!((readout["distance"].as_f64().unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn test_command_draw_floor_with_clicks() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "set_mode", "mode": "drawing_floor"},
        {"command": "click", "x": 0, "z": 0},
        {"command": "click", "x": 4, "z": 0},
        {"command": "click", "x": 4, "z": 3},
        {"command": "right_click", "x": 4, "z": 3},
        {"command": "tick", "count": 2}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses.iter().all(|r| r.success));
    assert_eq!(h.item_count(), 1);
    let frame = responses[5].data.as_ref().unwrap();
    assert_eq!(frame["draws"][0]["part"], "floor");
}

#[test]
fn test_command_delete_selected_and_undo() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "add_item", "item": {"id": "b", "type": "model", "asset": "bench"}},
        {"command": "select_item", "id": "b"},
        {"command": "delete_selected"},
        {"command": "tick"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[2].data.as_ref().unwrap()["removed"], "b");
    assert_eq!(h.item_count(), 0);
    assert!(!h.engine.scene().contains("b"));

    let resp = execute_json(&mut h, r#"{"command": "delete_selected"}"#).unwrap();
    assert!(!resp.success);

    let resp = execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["undone"], true);
    assert_eq!(h.item_count(), 1);
}

#[test]
fn test_command_set_mode_placing_and_editing() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "set_mode", "mode": "editing"}"#).unwrap();
    assert!(!resp.success);

    let resp = execute_json(
        &mut h,
        r#"{"command": "set_mode", "mode": "placing_item", "asset": "slide", "price": 900}"#,
    )
    .unwrap();
    assert!(resp.success);
    execute_json(&mut h, r#"{"command": "click", "x": 2, "z": 2}"#).unwrap();
    assert_eq!(h.item_count(), 1);
    let data = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap().data.unwrap();
    assert_eq!(data["items"][0]["price"], 900.0);
    assert_eq!(data["mode"]["mode"], "editing");
}

#[test]
fn test_command_export_scene() {
    let mut h = TestHarness::new();
    execute_json(
        &mut h,
        r#"{"command": "add_item", "item": {"id": "b", "type": "model", "asset": "bench"}}"#,
    )
    .unwrap();
    execute_json(&mut h, r#"{"command": "tick"}"#).unwrap();
    let data = execute_json(&mut h, r#"{"command": "export_scene"}"#).unwrap().data.unwrap();
    let nodes: serde_json::Value = serde_json::from_str(data["scene_json"].as_str().unwrap()).unwrap();
    assert_eq!(nodes[0]["id"], "b");
}
