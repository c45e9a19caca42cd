// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod editor;
pub mod equation;
pub mod error;
pub mod game;
pub mod history;
pub mod roller;
pub mod runtime;
pub mod score;
pub mod session;
pub mod steps;
pub mod ui;
pub mod util;

pub use app::{App, AppState};
pub use error::{GameError, Result};
