pub mod cli;
pub mod clock;
pub mod config;
pub mod duration;
pub mod glyph;
pub mod headless;
pub mod input;
pub mod notify;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod signals;
pub mod telemetry;
pub mod terminal_restore;

pub use clock::{ClockMode, TimeModel};
pub use config::ClockConfig;
