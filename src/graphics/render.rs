//! Frame rendering: scene to instance batches to a single render pass.

use std::collections::HashSet;
use std::ops::Range;
use std::time::Instant;

use super::Graphics;
use super::instance::{Globals, InstanceData};
use super::texture::GpuTexture;
use crate::canvas::Shape;
use crate::scene::Scene;

/// A run of consecutive instances drawn with one texture binding.
/// `texture` is `None` for solid shapes, which sample the white texel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Batch {
    pub texture: Option<u64>,
    pub range: Range<u32>,
}

/// Flattens the scene in draw order, merging neighbours that share a texture.
///
/// Text with an empty texture has nothing to show and is skipped.
pub(crate) fn build_batches(
    scene: &Scene,
    instances: &mut Vec<InstanceData>,
    batches: &mut Vec<Batch>,
) {
    instances.clear();
    batches.clear();

    for (_, prim) in scene.iter() {
        let texture = match &prim.shape {
            Shape::Textured(tex) if tex.width() == 0 || tex.height() == 0 => continue,
            Shape::Textured(tex) => Some(tex.id()),
            Shape::Rect | Shape::Ellipse => None,
        };

        let index = instances.len() as u32;
        instances.push(InstanceData::from_primitive(prim));
        match batches.last_mut() {
            Some(last) if last.texture == texture => last.range.end = index + 1,
            _ => batches.push(Batch {
                texture,
                range: index..index + 1,
            }),
        }
    }
}

fn elapsed_ms(t: Option<Instant>) -> f64 {
    t.map(|t0| t0.elapsed().as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

impl Graphics {
    /// Uploads textures new to this frame and frees those the scene dropped.
    fn sync_textures(&mut self, scene: &Scene) {
        let mut live = HashSet::new();
        for (_, prim) in scene.iter() {
            let Shape::Textured(tex) = &prim.shape else {
                continue;
            };
            live.insert(tex.id());
            if self.textures.contains(tex.id()) || tex.width() == 0 || tex.height() == 0 {
                continue;
            }
            match GpuTexture::from_rgba8(
                &self.device,
                &self.queue,
                &self.texture_bind_group_layout,
                &self.sampler,
                tex.width(),
                tex.height(),
                &tex.to_rgba8(),
            ) {
                Ok(gpu) => self.textures.insert(tex, gpu),
                Err(err) => tracing::warn!(id = tex.id(), %err, "text texture upload failed"),
            }
        }

        let evicted = self.textures.retain_live(&live);
        if evicted > 0 {
            tracing::trace!(evicted, cached = self.textures.len(), "text textures evicted");
        }
    }

    pub fn draw_scene(
        &mut self,
        surface: &wgpu::Surface<'_>,
        scene: &Scene,
        scale_factor: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        let profile_enabled = super::profile::profile_enabled();
        let start = profile_enabled.then(Instant::now);

        let frame = surface.get_current_texture()?;
        let dt_acquire_ms = elapsed_ms(start);

        let sf = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let logical_w = (self.config.width as f64 / sf) as f32;
        let logical_h = (self.config.height as f64 / sf) as f32;
        let globals = Globals::for_logical_size(logical_w, logical_h);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        self.sync_textures(scene);
        build_batches(scene, &mut self.batch, &mut self.batches);
        self.instances
            .upload(&self.device, &self.queue, &self.batch);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas_encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if !self.batch.is_empty() {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(1, &self.globals_bind_group, &[]);
                rpass.set_vertex_buffer(0, self.instances.buffer.slice(..));

                for batch in &self.batches {
                    let bind_group = match batch.texture {
                        None => &self.white.bind_group,
                        Some(id) => match self.textures.get(id) {
                            Some(gpu) => &gpu.bind_group,
                            None => continue,
                        },
                    };
                    rpass.set_bind_group(0, bind_group, &[]);
                    rpass.draw(0..4, batch.range.clone());
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();

        if profile_enabled {
            let total_ms = elapsed_ms(start);
            if let Some(s) = self.profile.record(total_ms, dt_acquire_ms) {
                tracing::info!(
                    frame = s.frame,
                    total_ms = format_args!("{:.3}", s.avg_total_ms),
                    work_ms = format_args!("{:.3}", s.avg_work_ms),
                    wait_ms = format_args!("{:.3}", s.avg_wait_ms),
                    min_ms = format_args!("{:.3}", s.min_total_ms),
                    max_ms = format_args!("{:.3}", s.max_total_ms),
                    "render timings"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Pt;
    use crate::canvas::Canvas;
    use crate::color::Rgba;
    use crate::text::TextTexture;

    fn at(x: f32, y: f32) -> [Pt; 2] {
        [Pt(x), Pt(y)]
    }

    #[test]
    fn solid_shapes_share_one_batch() {
        let mut scene = Scene::new(Pt(100.0), Pt(100.0));
        scene.add_rect(Rgba::WHITE, at(0.0, 0.0), at(100.0, 100.0));
        scene.add_ellipse(Rgba::PINK, at(5.0, 5.0), at(20.0, 20.0));
        scene.add_ellipse(Rgba::YELLOW, at(9.0, 9.0), at(20.0, 20.0));

        let (mut inst, mut batches) = (Vec::new(), Vec::new());
        build_batches(&scene, &mut inst, &mut batches);
        assert_eq!(inst.len(), 3);
        assert_eq!(
            batches,
            vec![Batch {
                texture: None,
                range: 0..3
            }]
        );
    }

    #[test]
    fn textures_split_batches_in_draw_order() {
        let mut scene = Scene::new(Pt(100.0), Pt(100.0));
        let tex = Arc::new(TextTexture::new(2, 2, vec![255; 4]));
        let id = tex.id();
        scene.add_textured_rect(tex.clone(), Rgba::BLACK, at(0.0, 0.0), at(2.0, 2.0));
        scene.add_textured_rect(tex, Rgba::WHITE, at(1.0, 0.0), at(2.0, 2.0));
        scene.add_rect(Rgba::WHITE, at(0.0, 0.0), at(10.0, 10.0));

        let (mut inst, mut batches) = (Vec::new(), Vec::new());
        build_batches(&scene, &mut inst, &mut batches);
        assert_eq!(
            batches,
            vec![
                Batch {
                    texture: Some(id),
                    range: 0..2
                },
                Batch {
                    texture: None,
                    range: 2..3
                },
            ]
        );
    }

    #[test]
    fn empty_text_is_not_drawn() {
        let mut scene = Scene::new(Pt(100.0), Pt(100.0));
        scene.add_rect(Rgba::WHITE, at(0.0, 0.0), at(1.0, 1.0));
        scene.add_textured_rect(
            Arc::new(TextTexture::empty()),
            Rgba::BLACK,
            at(0.0, 0.0),
            at(0.0, 0.0),
        );
        scene.add_rect(Rgba::BLACK, at(0.0, 0.0), at(1.0, 1.0));

        let (mut inst, mut batches) = (Vec::new(), Vec::new());
        build_batches(&scene, &mut inst, &mut batches);
        assert_eq!(inst.len(), 2);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].range, 0..2);
    }
}
