use bytemuck::{Pod, Zeroable};

use crate::canvas::{Primitive, Shape};

pub(crate) const KIND_RECT: u32 = 0;
pub(crate) const KIND_ELLIPSE: u32 = 1;
pub(crate) const KIND_TEXTURED: u32 = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub pos: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub kind: u32,
}

impl InstanceData {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // size
        2 => Float32x4, // color
        3 => Uint32,    // kind
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    pub(crate) fn from_primitive(p: &Primitive) -> Self {
        let kind = match p.shape {
            Shape::Rect => KIND_RECT,
            Shape::Ellipse => KIND_ELLIPSE,
            Shape::Textured(_) => KIND_TEXTURED,
        };
        Self {
            pos: [p.position[0].as_f32(), p.position[1].as_f32()],
            size: [p.size[0].as_f32(), p.size[1].as_f32()],
            color: p.color.to_array(),
            kind,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct Globals {
    // screen.xy = [2.0 / logical_w, 2.0 / logical_h]
    pub screen: [f32; 4],
}

impl Globals {
    pub(crate) fn for_logical_size(width: f32, height: f32) -> Self {
        let w = width.max(1.0);
        let h = height.max(1.0);
        Self {
            screen: [2.0 / w, 2.0 / h, 0.0, 0.0],
        }
    }
}

/// Growable instance vertex buffer, rewritten every frame.
pub(crate) struct InstanceBuffer {
    pub(crate) buffer: wgpu::Buffer,
    capacity: u64,
}

impl InstanceBuffer {
    const STRIDE: u64 = std::mem::size_of::<InstanceData>() as u64;

    pub(crate) fn new(device: &wgpu::Device, capacity: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Self::create(device, capacity),
            capacity,
        }
    }

    fn create(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("canvas_instance_buffer"),
            size: capacity * Self::STRIDE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[InstanceData],
    ) {
        let needed = instances.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = Self::create(device, self.capacity);
            tracing::debug!(capacity = self.capacity, "instance buffer grown");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pt;
    use crate::color::Rgba;

    #[test]
    fn instance_layout_matches_shader_stride() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 44);
    }

    #[test]
    fn primitive_maps_to_instance_kind() {
        let p = Primitive {
            shape: Shape::Ellipse,
            color: Rgba::PINK,
            position: [Pt(1.0), Pt(2.0)],
            size: [Pt(20.0), Pt(20.0)],
        };
        let inst = InstanceData::from_primitive(&p);
        assert_eq!(inst.kind, KIND_ELLIPSE);
        assert_eq!(inst.pos, [1.0, 2.0]);
        assert_eq!(inst.color, [1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn globals_never_divide_by_zero() {
        let g = Globals::for_logical_size(0.0, 400.0);
        assert_eq!(g.screen[0], 2.0);
        assert_eq!(g.screen[1], 0.005);
    }
}
