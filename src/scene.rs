use std::sync::Arc;

use slotmap::SlotMap;

use crate::Pt;
use crate::canvas::{Canvas, Primitive, PrimitiveId, Shape};
use crate::color::Rgba;
use crate::text::TextTexture;

/// In-memory [`Canvas`] the renderer draws from.
#[derive(Debug, Default)]
pub struct Scene {
    primitives: SlotMap<PrimitiveId, Primitive>,
    order: Vec<PrimitiveId>,
    size: (Pt, Pt),
    dirty: bool,
}

impl Scene {
    pub fn new(width: Pt, height: Pt) -> Self {
        let mut scene = Self::default();
        scene.resize(width, height);
        scene
    }

    pub fn resize(&mut self, width: Pt, height: Pt) {
        let size = (width.max(Pt::ZERO), height.max(Pt::ZERO));
        if size != self.size {
            self.size = size;
            self.dirty = true;
        }
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.primitives.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Primitives in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.primitives.get(*id).map(|p| (*id, p)))
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn push(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = self.primitives.insert(primitive);
        self.order.push(id);
        self.dirty = true;
        id
    }

    fn update(&mut self, id: PrimitiveId, f: impl FnOnce(&mut Primitive)) {
        if let Some(p) = self.primitives.get_mut(id) {
            f(p);
            self.dirty = true;
        }
    }
}

impl Canvas for Scene {
    fn size(&self) -> (Pt, Pt) {
        self.size
    }

    fn add_rect(&mut self, color: Rgba, position: [Pt; 2], size: [Pt; 2]) -> PrimitiveId {
        self.push(Primitive {
            shape: Shape::Rect,
            color,
            position,
            size,
        })
    }

    fn add_ellipse(&mut self, color: Rgba, position: [Pt; 2], size: [Pt; 2]) -> PrimitiveId {
        self.push(Primitive {
            shape: Shape::Ellipse,
            color,
            position,
            size,
        })
    }

    fn add_textured_rect(
        &mut self,
        texture: Arc<TextTexture>,
        color: Rgba,
        position: [Pt; 2],
        size: [Pt; 2],
    ) -> PrimitiveId {
        self.push(Primitive {
            shape: Shape::Textured(texture),
            color,
            position,
            size,
        })
    }

    fn set_color(&mut self, id: PrimitiveId, color: Rgba) {
        self.update(id, |p| p.color = color);
    }

    fn set_position(&mut self, id: PrimitiveId, position: [Pt; 2]) {
        self.update(id, |p| p.position = position);
    }

    fn set_size(&mut self, id: PrimitiveId, size: [Pt; 2]) {
        self.update(id, |p| p.size = size);
    }

    fn set_texture(&mut self, id: PrimitiveId, texture: Arc<TextTexture>) {
        self.update(id, |p| p.shape = Shape::Textured(texture));
    }

    fn remove(&mut self, id: PrimitiveId) -> bool {
        if self.primitives.remove(id).is_none() {
            return false;
        }
        self.order.retain(|o| *o != id);
        self.dirty = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt2(x: f32, y: f32) -> [Pt; 2] {
        [Pt(x), Pt(y)]
    }

    #[test]
    fn draw_order_follows_creation() {
        let mut scene = Scene::new(Pt(100.0), Pt(100.0));
        let a = scene.add_rect(Rgba::WHITE, pt2(0.0, 0.0), pt2(10.0, 10.0));
        let b = scene.add_ellipse(Rgba::BLACK, pt2(5.0, 5.0), pt2(20.0, 20.0));
        let c = scene.add_rect(Rgba::YELLOW, pt2(1.0, 1.0), pt2(2.0, 2.0));
        scene.remove(b);

        let ids: Vec<PrimitiveId> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn removing_twice_is_a_no_op() {
        let mut scene = Scene::new(Pt(100.0), Pt(100.0));
        let id = scene.add_ellipse(Rgba::WHITE, pt2(0.0, 0.0), pt2(20.0, 20.0));
        assert!(scene.remove(id));
        assert!(!scene.remove(id));
        assert!(scene.is_empty());

        // Stale handles never touch newer primitives.
        let fresh = scene.add_rect(Rgba::BLACK, pt2(0.0, 0.0), pt2(1.0, 1.0));
        scene.set_color(id, Rgba::PINK);
        assert!(!scene.remove(id));
        assert_eq!(scene.get(fresh).map(|p| p.color), Some(Rgba::BLACK));
    }

    #[test]
    fn mutations_mark_the_scene_dirty() {
        let mut scene = Scene::new(Pt(10.0), Pt(10.0));
        assert!(scene.take_dirty());
        assert!(!scene.take_dirty());

        let id = scene.add_rect(Rgba::WHITE, pt2(0.0, 0.0), pt2(1.0, 1.0));
        assert!(scene.take_dirty());
        scene.set_position(id, pt2(3.0, 4.0));
        assert!(scene.take_dirty());
        assert_eq!(scene.get(id).unwrap().position, pt2(3.0, 4.0));

        scene.resize(Pt(10.0), Pt(10.0));
        assert!(!scene.take_dirty());
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let scene = Scene::new(Pt(-5.0), Pt(20.0));
        assert_eq!(scene.size(), (Pt::ZERO, Pt(20.0)));
    }
}
