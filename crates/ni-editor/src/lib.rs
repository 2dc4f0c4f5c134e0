//! # ni-editor: Editor core for ni
//!
//! Everything between a decoded key and a frame of terminal bytes, with no
//! terminal or file system access of its own:
//!
//! - **[`arena`]**: fixed pool of line-storage slots with an index free list
//! - **[`document`]**: ordered byte lines on the arena, line and char edits
//! - **[`cursor`]**: cursor movement, normalization, `cx2rx`, viewport scrolling
//! - **[`word`]**: word and character motions on a single line
//! - **[`mode`]** / **[`chord`]**: Normal/Insert state and pending multi-key commands
//! - **[`editor`]**: the modal command interpreter tying the above together
//! - **[`render`]**: tab expansion, status/message lines, frame assembly
//! - **[`config`]** / **[`error`]**: bounds and error types

pub mod arena;
pub mod chord;
pub mod config;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod mode;
pub mod render;
pub mod word;

pub use config::Config;
pub use editor::Editor;
pub use error::{EditError, RenderError};
pub use render::Renderer;
