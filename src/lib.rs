//! `lined`: a minimal full-screen terminal text editor.
//!
//! Keystrokes arrive as raw bytes, are decoded into [`command::Command`]s and
//! applied to a [`buffer::Buffer`]. The [`render::Renderer`] then brings the
//! terminal in line with the buffer, diffing against the rows it drew last
//! time unless the edit moved rows around.

pub mod buffer;
pub mod command;
pub mod config;
pub mod editor;
pub mod logging;
pub mod render;
pub mod terminal;
