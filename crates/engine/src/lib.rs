// Library crate: every engine module is exposed for integration tests, the
// JSON command interface and the headless runner binary.

pub mod build;
pub mod collision;
pub mod command;
pub mod engine;
pub mod export;
pub mod fixtures;
pub mod harness;
pub mod helpers;
pub mod interaction;
pub mod state;
pub mod sync;
pub mod validation;
pub mod vertex_edit;
pub mod viewport;
