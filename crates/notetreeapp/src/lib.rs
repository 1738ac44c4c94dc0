//! # Notetree Architecture
//!
//! Notetree is a **UI-agnostic notebook library**: a tree of Markdown pages that link to
//! each other by position. The `notetree` binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (notetree crate)                                       │
//! │  - Parses arguments, prints results, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the live notebook, search index and store           │
//! │  - Parses user paths, saves after every change              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic over the in-memory notebook               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (tree, path, rewrite, search, markdown, links)      │
//! │  Storage (store/): NotebookStore, FileStore, MemoryStore    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Positional Links
//!
//! A page is addressed by its path from the root (`[0,2,1]`), and page links embed that
//! path verbatim: `[Books]([0,2,1])`. Paths change whenever the tree changes shape, so
//! every structural edit runs inside [`rewrite::rewrite_around`], which repoints each
//! link at the new path of the page it referred to. The on-disk format stays the plain
//! positional one.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns Rust types. It never
//! prints and never exits. Logging goes through `tracing`; the subscriber is the
//! client's business.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade, entry point for all operations
//! - [`commands`]: business logic for each command
//! - [`tree`] / [`path`]: the page arena and positional addressing
//! - [`rewrite`]: link retargeting around structural edits
//! - [`search`]: the lazily rebuilt search index and filters
//! - [`markdown`] / [`links`]: page assembly and link classification
//! - [`notebook`] / [`registry`]: the document, its images and templates, JSON form
//! - [`store`]: storage abstraction and implementations
//! - [`config`] / [`init`]: configuration and file locations
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod links;
pub mod markdown;
pub mod notebook;
pub mod path;
pub mod registry;
pub mod rewrite;
pub mod search;
pub mod store;
pub mod tree;
