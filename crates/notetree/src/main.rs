//! # Notetree CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/notetreeapp/`: the UI-agnostic notebook library
//! - `crates/notetree/`: this CLI, one client of that library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/notetree/src/cli/)                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring and dispatch (commands.rs)                │
//! │  - Terminal rendering with console styles (render.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/notetreeapp/src/api.rs)                  │
//! │  - Parses page paths, dispatches, saves after changes       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/notetreeapp/src/commands/*)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. The CLI owns argument parsing,
//! logging setup, rendering, and exit codes.
//!
//! ## Testing Approach
//!
//! - Command and API layers carry the unit tests, in the library crate.
//! - This crate tests parsing and rendering in place, and end to end through the
//!   built binary with `assert_cmd` (see `tests/`).

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
