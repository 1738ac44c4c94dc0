//! # CLI Behavior
//!
//! This is **one possible UI client** for notetree, not the application itself. The CLI
//! is the only place that knows about terminal I/O, exit codes and output formatting.
//!
//! ## Addressing Pages
//!
//! Every command that takes a page accepts its path either dotted (`0.2.1`) or as JSON
//! (`[0,2,1]`). `notetree tree` prints the dotted path of each page.
//!
//! ## Content From Stdin
//!
//! `add` and `edit` read the page body from `--content` when given, otherwise from
//! piped stdin. Nothing is read from an interactive terminal.
//!
//! ## Output
//!
//! Results render as styled text. `--json` prints the full structured result instead,
//! for scripts.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. The level comes from `NOTETREE_LOG`
//! (an `EnvFilter` directive), defaulting to `warn`, or `debug` with `--verbose`.
//!
//! ## Module Structure
//!
//! - `commands`: context setup and dispatch to the API
//! - `render`: output formatting (tree, search table, messages)
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
