//! GPU renderer for the retained [`Scene`](crate::scene::Scene).
//!
//! Every primitive becomes one instanced quad; solid shapes and text
//! share a single pipeline and differ only in their bound texture.

mod core;
mod instance;
mod profile;
mod render;
mod texture;

pub use self::core::Graphics;
