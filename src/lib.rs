//! typedex: browse Pokémon by type in the terminal.
//!
//! The binary wires these modules into a tui-dispatch app; they are exposed
//! here for the integration tests.

pub mod action;
pub mod api;
pub mod config;
pub mod effect;
pub mod reducer;
pub mod roster;
pub mod sprite;
pub mod sprite_backend;
pub mod state;
pub mod telemetry;
pub mod ui;
