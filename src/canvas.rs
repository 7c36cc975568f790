//! Drawing surface seams used by the visual controller.

use std::sync::Arc;

use crate::Pt;
use crate::color::Rgba;
use crate::text::TextTexture;

slotmap::new_key_type! {
    /// Handle to a primitive on a [`Canvas`].
    pub struct PrimitiveId;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect,
    Ellipse,
    /// Rectangle filled with a rasterized text texture, tinted by the primitive color.
    Textured(Arc<TextTexture>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub color: Rgba,
    /// Top-left corner.
    pub position: [Pt; 2],
    pub size: [Pt; 2],
}

/// Retained drawing surface.
///
/// Primitives are drawn in creation order. Mutating or removing a primitive
/// that no longer exists is a no-op.
pub trait Canvas {
    /// Current logical size of the surface.
    fn size(&self) -> (Pt, Pt);

    fn add_rect(&mut self, color: Rgba, position: [Pt; 2], size: [Pt; 2]) -> PrimitiveId;

    fn add_ellipse(&mut self, color: Rgba, position: [Pt; 2], size: [Pt; 2]) -> PrimitiveId;

    fn add_textured_rect(
        &mut self,
        texture: Arc<TextTexture>,
        color: Rgba,
        position: [Pt; 2],
        size: [Pt; 2],
    ) -> PrimitiveId;

    fn set_color(&mut self, id: PrimitiveId, color: Rgba);

    fn set_position(&mut self, id: PrimitiveId, position: [Pt; 2]);

    fn set_size(&mut self, id: PrimitiveId, size: [Pt; 2]);

    fn set_texture(&mut self, id: PrimitiveId, texture: Arc<TextTexture>);

    /// Returns `false` if the primitive was already gone.
    fn remove(&mut self, id: PrimitiveId) -> bool;
}

/// Turns text into a coverage texture.
pub trait TextRasterizer {
    fn rasterize(&mut self, text: &str, font_size: f32, bold: bool) -> Arc<TextTexture>;
}
