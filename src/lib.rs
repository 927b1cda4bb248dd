//! Nexly is a terminal coding assistant that streams answers from remote LLM
//! providers.
//!
//! - [`core`] holds configuration, provider profiles, the wire codecs, the
//!   streaming exchange and the session state machine.
//! - [`ui`] renders the terminal interface and runs the interactive loop.
//! - [`commands`] implements the slash commands offered by the palette.
//! - [`api`] defines the request and response payloads sent to providers.
//!
//! The binary routes through [`cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
