//! Mock implementation of [`SpriteDevice`] for testing.
//!
//! Records every call without touching a GPU.

use parking_lot::Mutex;
use tessera_core::geometry::Size;

use crate::sprite_device::{
    FrameParameters, LightingConstants, RenderStates, SpriteDevice, TextureId,
};

/// A recorded device call, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    SetLightingConstants(LightingConstants),
    UploadVertices {
        vertex_count: usize,
        data: Vec<u8>,
    },
    UploadIndices {
        indices: Vec<u16>,
    },
    ApplyRenderStates(RenderStates),
    SetFrameParameters(FrameParameters),
    BindTexture {
        slot: u32,
        texture: TextureId,
    },
    DrawIndexed {
        topology: wgpu::PrimitiveTopology,
        base_vertex: i32,
        start_index: u32,
        primitive_count: u32,
    },
}

/// Recording implementation of [`SpriteDevice`].
///
/// Uses `parking_lot::Mutex` so the `&self` trait methods can record, and so
/// the mock stays `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use tessera_core::geometry::Size;
/// use tessera_test_utils::{DeviceCall, MockSpriteDevice, SpriteDevice};
///
/// let mock = MockSpriteDevice::new(Size::new(640, 480));
/// mock.upload_indices(&[0, 1, 2, 1, 3, 2]);
///
/// assert_eq!(mock.call_count(), 1);
/// assert_eq!(mock.last_indices(), Some(vec![0, 1, 2, 1, 3, 2]));
/// ```
pub struct MockSpriteDevice {
    viewport: Mutex<Size<u32>>,
    calls: Mutex<Vec<DeviceCall>>,
}

impl MockSpriteDevice {
    pub fn new(viewport: Size<u32>) -> Self {
        Self {
            viewport: Mutex::new(viewport),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Simulate a window resize.
    pub fn set_viewport(&self, viewport: Size<u32>) {
        *self.viewport.lock() = viewport;
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().clone()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_draws(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DeviceCall::DrawIndexed { .. }))
            .count()
    }

    pub fn count_uploads(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DeviceCall::UploadVertices { .. }))
            .count()
    }

    /// `(texture, start_index, primitive_count)` for every draw, pairing each
    /// draw with the texture most recently bound to slot 0.
    ///
    /// Draws issued before any bind are skipped.
    pub fn draws(&self) -> Vec<(TextureId, u32, u32)> {
        let mut bound = None;
        let mut draws = Vec::new();
        for call in self.calls.lock().iter() {
            match call {
                DeviceCall::BindTexture { slot: 0, texture } => bound = Some(*texture),
                DeviceCall::DrawIndexed {
                    start_index,
                    primitive_count,
                    ..
                } => {
                    if let Some(texture) = bound {
                        draws.push((texture, *start_index, *primitive_count));
                    }
                }
                _ => {}
            }
        }
        draws
    }

    /// Indices from the most recent index upload.
    pub fn last_indices(&self) -> Option<Vec<u16>> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            DeviceCall::UploadIndices { indices } => Some(indices.clone()),
            _ => None,
        })
    }

    /// Raw bytes and vertex count from the most recent vertex upload.
    pub fn last_vertices(&self) -> Option<(Vec<u8>, usize)> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            DeviceCall::UploadVertices { data, vertex_count } => Some((data.clone(), *vertex_count)),
            _ => None,
        })
    }

    pub fn last_frame_parameters(&self) -> Option<FrameParameters> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            DeviceCall::SetFrameParameters(params) => Some(*params),
            _ => None,
        })
    }

    pub fn last_lighting_constants(&self) -> Option<LightingConstants> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            DeviceCall::SetLightingConstants(constants) => Some(*constants),
            _ => None,
        })
    }
}

impl Default for MockSpriteDevice {
    fn default() -> Self {
        Self::new(Size::new(800, 600))
    }
}

impl SpriteDevice for MockSpriteDevice {
    fn viewport(&self) -> Size<u32> {
        *self.viewport.lock()
    }

    fn set_lighting_constants(&self, constants: &LightingConstants) {
        self.calls
            .lock()
            .push(DeviceCall::SetLightingConstants(*constants));
    }

    fn upload_vertices(&self, data: &[u8], vertex_count: usize) {
        self.calls.lock().push(DeviceCall::UploadVertices {
            vertex_count,
            data: data.to_vec(),
        });
    }

    fn upload_indices(&self, indices: &[u16]) {
        self.calls.lock().push(DeviceCall::UploadIndices {
            indices: indices.to_vec(),
        });
    }

    fn apply_render_states(&self, states: &RenderStates) {
        self.calls.lock().push(DeviceCall::ApplyRenderStates(*states));
    }

    fn set_frame_parameters(&self, params: &FrameParameters) {
        self.calls.lock().push(DeviceCall::SetFrameParameters(*params));
    }

    fn bind_texture(&self, slot: u32, texture: TextureId) {
        self.calls
            .lock()
            .push(DeviceCall::BindTexture { slot, texture });
    }

    fn draw_indexed(
        &self,
        topology: wgpu::PrimitiveTopology,
        base_vertex: i32,
        start_index: u32,
        primitive_count: u32,
    ) {
        self.calls.lock().push(DeviceCall::DrawIndexed {
            topology,
            base_vertex,
            start_index,
            primitive_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_resize() {
        let mock = MockSpriteDevice::new(Size::new(640, 480));
        assert_eq!(mock.viewport(), Size::new(640, 480));
        mock.set_viewport(Size::new(1024, 768));
        assert_eq!(mock.viewport(), Size::new(1024, 768));
    }

    #[test]
    fn test_draws_pair_with_last_bind() {
        let mock = MockSpriteDevice::default();
        mock.draw_indexed(wgpu::PrimitiveTopology::TriangleList, 0, 0, 2);
        mock.bind_texture(0, TextureId::new(1));
        mock.draw_indexed(wgpu::PrimitiveTopology::TriangleList, 0, 0, 4);
        mock.bind_texture(1, TextureId::new(9));
        mock.draw_indexed(wgpu::PrimitiveTopology::TriangleList, 0, 12, 2);

        assert_eq!(mock.count_draws(), 3);
        assert_eq!(
            mock.draws(),
            vec![(TextureId::new(1), 0, 4), (TextureId::new(1), 12, 2)]
        );
    }

    #[test]
    fn test_clear_calls() {
        let mock = MockSpriteDevice::default();
        mock.upload_vertices(&[0u8; 16], 1);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.count_uploads(), 1);
        assert_eq!(mock.last_vertices(), Some((vec![0u8; 16], 1)));

        mock.clear_calls();
        assert_eq!(mock.call_count(), 0);
        assert_eq!(mock.last_vertices(), None);
    }
}
