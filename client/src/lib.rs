pub mod actions;
pub mod ai;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod keyboard;
pub mod net;
pub mod raster;
pub mod render;
pub mod selection;
pub mod state;
pub mod util;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod paint;

pub use ai::{AiOrchestrator, Surface};
pub use config::EditorConfig;
pub use error::{AiError, CanvasError};
pub use net::{AiTransport, HttpReply};
pub use state::State;

#[cfg(target_arch = "wasm32")]
pub use app::run;
