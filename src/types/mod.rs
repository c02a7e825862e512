// tabhost shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod command;
pub mod download;
pub mod errors;
pub mod privacy;
pub mod render;
pub mod settings;
pub mod tab;
