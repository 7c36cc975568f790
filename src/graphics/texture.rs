//! GPU copies of text textures.

use std::collections::{HashMap, HashSet};

use crate::text::TextTexture;

pub(crate) struct GpuTexture {
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

impl GpuTexture {
    /// Uploads straight RGBA8 pixels. Zero-sized inputs become a transparent texel.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<Self> {
        let (width, height, rgba) = if width == 0 || height == 0 {
            (1, 1, &[0u8; 4][..])
        } else {
            (width, height, rgba)
        };

        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| anyhow::anyhow!("invalid texture size {}x{}", width, height))?
            as usize;
        if rgba.len() != expected {
            return Err(anyhow::anyhow!(
                "invalid rgba length: got {}, expected {}",
                rgba.len(),
                expected
            ));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("text_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("text_texture_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Ok(Self {
            texture,
            bind_group,
        })
    }
}

/// Text textures uploaded to the GPU, keyed by [`TextTexture::id`].
#[derive(Default)]
pub(crate) struct TextureCache {
    entries: HashMap<u64, GpuTexture>,
}

impl TextureCache {
    pub fn get(&self, id: u64) -> Option<&GpuTexture> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn insert(&mut self, tex: &TextTexture, gpu: GpuTexture) {
        self.entries.insert(tex.id(), gpu);
    }

    /// Drops every entry whose id is not in `live`. Returns how many were evicted.
    pub fn retain_live(&mut self, live: &HashSet<u64>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
