//! GPU textures and their bind groups, keyed by [`TextureId`].

use tessera_core::alloc::HashMap;
use tessera_test_utils::{SamplerState, TextureId};

use super::pipeline;

struct CachedTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// Owns every loaded sprite texture and one bind group per texture.
///
/// All bind groups share a single sampler. Changing the sampler state
/// rebuilds them.
pub struct TextureCache {
    layout: wgpu::BindGroupLayout,
    sampler_state: SamplerState,
    sampler: wgpu::Sampler,
    entries: HashMap<TextureId, CachedTexture>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, sampler_state: SamplerState) -> Self {
        Self {
            layout: pipeline::create_texture_bind_group_layout(device),
            sampler: pipeline::create_sampler(device, &sampler_state),
            sampler_state,
            entries: HashMap::default(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn insert(&mut self, device: &wgpu::Device, id: TextureId, texture: wgpu::Texture) {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.create_bind_group(device, &view);
        if let Some(old) = self.entries.insert(
            id,
            CachedTexture {
                texture,
                view,
                bind_group,
            },
        ) {
            old.texture.destroy();
        }
    }

    /// Remove and destroy a texture. Returns `false` if the id was unknown.
    pub fn remove(&mut self, id: TextureId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                entry.texture.destroy();
                true
            }
            None => false,
        }
    }

    pub fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.entries.get(&id).map(|entry| &entry.bind_group)
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Switch the shared sampler. No-op if `state` is unchanged.
    pub fn set_sampler(&mut self, device: &wgpu::Device, state: SamplerState) {
        if state == self.sampler_state {
            return;
        }
        tracing::debug!("Sampler state changed, rebuilding {} bind groups", self.entries.len());
        self.sampler_state = state;
        self.sampler = pipeline::create_sampler(device, &state);

        let rebuilt: Vec<(TextureId, wgpu::BindGroup)> = self
            .entries
            .iter()
            .map(|(id, entry)| (*id, self.create_bind_group(device, &entry.view)))
            .collect();
        for (id, bind_group) in rebuilt {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.bind_group = bind_group;
            }
        }
    }

    fn create_bind_group(&self, device: &wgpu::Device, view: &wgpu::TextureView) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_texture_bg"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}
