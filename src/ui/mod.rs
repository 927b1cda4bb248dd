//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop, terminal lifecycle and key mapping.
//! - [`renderer`]: frame composition for the transcript, palette and prompt.
//! - [`markdown`] and [`theme`]: message styling.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
