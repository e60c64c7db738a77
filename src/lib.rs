//! Roadwatch is a terminal client for an object-detection demo service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session state machines: the live result stream
//!   (per-file-key event connection with latest-wins frame decoding), the
//!   training-results fetch with its explain hand-off, and the assistant
//!   chat with chunked context seeding, single-flight sends, and the
//!   cancellable typing reveal.
//! - [`api`] defines the payloads exchanged with the two collaborators: the
//!   detection backend's REST surface and an OpenAI-compatible completion
//!   endpoint.
//! - [`cli`] implements the subcommands that drive the sessions from a
//!   terminal.
//! - [`utils`] carries URL normalization and the opt-in transcript logger.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::run`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
