//! JSON command protocol for scripted sessions against the headless harness.

use serde::{Deserialize, Serialize};
use shared::Item;

use crate::harness::TestHarness;
use crate::interaction::Mode;

/// A command a scripted client can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    /// Switch interaction mode. `asset`/`price` apply to `placing_item`.
    SetMode {
        mode: String,
        #[serde(default)]
        asset: Option<String>,
        #[serde(default)]
        price: f64,
    },
    /// Add an item to the store (undoable)
    AddItem { item: Item },
    /// Select an item by id
    SelectItem { id: String },
    Deselect,
    /// Pick a control point of the selected Floor/Fence
    SelectVertex {
        index: usize,
        #[serde(default)]
        extend: bool,
    },
    ApplyDistance { length: f64 },
    ApplyAngle { degrees: f64 },
    SwapSelection,
    DeleteSelected,
    /// Primary click straight down onto the ground at (x, z)
    Click {
        x: f32,
        z: f32,
        #[serde(default)]
        extend: bool,
    },
    /// Secondary click (finishes a draft)
    RightClick { x: f32, z: f32 },
    /// Ground drag of the selected item
    Drag { from: [f32; 2], to: [f32; 2] },
    Undo,
    Redo,
    /// List items and live objects
    Inspect,
    /// Current vertex selection with distance/angle
    Readout,
    /// Run ticks and report the last frame
    Tick {
        #[serde(default = "default_tick_count")]
        count: usize,
    },
    /// Export the live scene as export nodes
    ExportScene,
}

fn default_tick_count() -> usize {
    1
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    /// `ok` when `applied`, otherwise an error with `msg`
    fn applied(applied: bool, msg: &str) -> Self {
        if applied {
            Self::ok()
        } else {
            Self::err(msg)
        }
    }
}

fn parse_mode(mode: &str, asset: Option<String>, price: f64) -> Result<Mode, String> {
    Ok(match mode {
        "idle" => Mode::Idle,
        "drawing_floor" => Mode::DrawingFloor,
        "drawing_fence" => Mode::DrawingFence,
        "placing_item" => Mode::PlacingItem {
            asset: asset.ok_or("placing_item requires an asset")?,
            price,
        },
        "editing" => Mode::Editing,
        "measuring" => Mode::Measuring,
        "catalog" => Mode::Catalog,
        other => return Err(format!("Unknown mode '{other}'")),
    })
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: EngineCommand) -> CommandResponse {
    match cmd {
        EngineCommand::SetMode { mode, asset, price } => match parse_mode(&mode, asset, price) {
            Ok(mode) => CommandResponse::applied(
                harness.engine.set_mode(mode),
                "editing mode requires a selected item",
            ),
            Err(e) => CommandResponse::err(e),
        },

        EngineCommand::AddItem { item } => {
            let id = item.id.clone();
            match harness.add_item(item) {
                Ok(()) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        EngineCommand::SelectItem { id } => {
            // The item needs a live object first
            if !harness.engine.scene().contains(&id) {
                harness.tick();
            }
            CommandResponse::applied(
                harness.engine.select_item(&id),
                &format!("No live object '{id}'"),
            )
        }

        EngineCommand::Deselect => {
            harness.engine.deselect();
            CommandResponse::ok()
        }

        EngineCommand::SelectVertex { index, extend } => CommandResponse::applied(
            harness.engine.select_vertex(index, extend),
            "no Floor/Fence selected or index out of range",
        ),

        EngineCommand::ApplyDistance { length } => CommandResponse::applied(
            harness.engine.apply_distance(length),
            "distance not applied",
        ),

        EngineCommand::ApplyAngle { degrees } => CommandResponse::applied(
            harness.engine.apply_angle(degrees),
            "angle not applied",
        ),

        EngineCommand::SwapSelection => CommandResponse::applied(
            harness.engine.swap_selection(),
            "swap needs exactly two selected points",
        ),

        EngineCommand::DeleteSelected => match harness.engine.delete_selected() {
            Some(id) => CommandResponse::ok_with_data(serde_json::json!({ "removed": id })),
            None => CommandResponse::err("nothing selected"),
        },

        EngineCommand::Click { x, z, extend } => {
            let outcome = if extend {
                harness.shift_click(x, z)
            } else {
                harness.click(x, z)
            };
            CommandResponse::ok_with_data(serde_json::json!({ "outcome": format!("{outcome:?}") }))
        }

        EngineCommand::RightClick { x, z } => {
            let outcome = harness.right_click(x, z);
            CommandResponse::ok_with_data(serde_json::json!({ "outcome": format!("{outcome:?}") }))
        }

        EngineCommand::Drag { from, to } => {
            let outcome = harness.drag((from[0], from[1]), (to[0], to[1]));
            CommandResponse::ok_with_data(serde_json::json!({ "outcome": format!("{outcome:?}") }))
        }

        EngineCommand::Undo => {
            let success = harness.engine.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        EngineCommand::Redo => {
            let success = harness.engine.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        EngineCommand::Inspect => {
            let items: Vec<serde_json::Value> = harness
                .engine
                .store()
                .document()
                .items
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "id": item.id,
                        "type": item.item_type(),
                        "price": item.price,
                        "point_count": item.points().map_or(0, <[_]>::len),
                        "live": harness.engine.scene().contains(&item.id),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "item_count": items.len(),
                "items": items,
                "mode": harness.engine.mode(),
                "selected": harness.engine.selected_item(),
            }))
        }

        EngineCommand::Readout => match harness.engine.vertex_readout() {
            Some(readout) => match serde_json::to_value(readout) {
                Ok(value) => CommandResponse::ok_with_data(value),
                Err(e) => CommandResponse::err(e.to_string()),
            },
            None => CommandResponse::err("no Floor/Fence selected"),
        },

        EngineCommand::Tick { count } => {
            for _ in 0..count {
                harness.tick();
            }
            match serde_json::to_value(harness.last_frame()) {
                Ok(frame) => CommandResponse::ok_with_data(frame),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        EngineCommand::ExportScene => {
            let json = crate::export::export_scene_json(harness.engine.scene());
            CommandResponse::ok_with_data(serde_json::json!({ "scene_json": json }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: EngineCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EngineCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
