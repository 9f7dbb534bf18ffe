//! Graphics context and wgpu sprite device tests.
//!
//! These need a GPU: run with `cargo test --test context_tests -- --ignored`.

use std::sync::Arc;

use tessera_core::geometry::Size;
use tessera_render::{
    BatchConfig, GraphicsContext, SpriteBatch, SpriteDevice, SpriteVertex, TextureError,
    WgpuSpriteDevice,
};

#[test]
#[ignore] // Requires GPU
fn test_context_creation_sync() {
    match GraphicsContext::new_owned_sync() {
        Ok(ctx) => {
            assert_eq!(Arc::strong_count(&ctx), 1);
            assert!(ctx.max_texture_dimension_2d() > 0);
        }
        Err(e) => println!("GPU not available: {}", e),
    }
}

#[test]
#[ignore] // Requires GPU
fn test_load_and_unload_texture() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        return;
    };
    let device = WgpuSpriteDevice::new(ctx, TARGET_FORMAT, Size::new(64, 64));

    assert_eq!(device.load_texture(&[], 0, 4), Err(TextureError::ZeroSize));
    assert_eq!(
        device.load_texture(&[0; 12], 2, 2),
        Err(TextureError::DataLength {
            expected: 16,
            actual: 12
        })
    );

    let mut first = device.load_texture(&[255; 16], 2, 2).unwrap();
    let second = device.load_texture(&[255; 16], 2, 2).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(device.texture_count(), 2);

    device.unload_texture(&mut first);
    assert!(first.is_disposed());
    assert_eq!(device.texture_count(), 1);
}

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Render the device's recorded frame into a fresh target and read it back
/// as tightly packed RGBA8 rows.
fn render_to_pixels(ctx: &GraphicsContext, device: &WgpuSpriteDevice, viewport: Size<u32>) -> Vec<u8> {
    let extent = wgpu::Extent3d {
        width: viewport.width,
        height: viewport.height,
        depth_or_array_layers: 1,
    };
    let target = ctx.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("test_target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = device.depth_view();

    // 256-byte row alignment holds for the 64-pixel-wide targets used here.
    let bytes_per_row = viewport.width * 4;
    let readback = ctx.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("test_readback"),
        size: u64::from(bytes_per_row * viewport.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("test_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        device.render(&mut pass);
    }
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(viewport.height),
            },
        },
        extent,
    );
    ctx.queue().submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = ctx.device().poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: None,
    });
    rx.recv().unwrap().unwrap();
    let pixels = slice.get_mapped_range().to_vec();
    readback.unmap();
    pixels
}

fn pixel(pixels: &[u8], viewport: Size<u32>, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * viewport.width + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
#[ignore] // Requires GPU
fn test_render_batch_into_pass() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        return;
    };
    let viewport = Size::new(64, 64);
    let device = Arc::new(WgpuSpriteDevice::new(ctx.clone(), TARGET_FORMAT, viewport));
    let texture = device.load_texture(&[255; 16], 2, 2).unwrap();

    let mut batch = SpriteBatch::new(device.clone(), BatchConfig::default());
    batch.begin_draw().unwrap();
    let quad = SpriteVertex::quad(8.0, 8.0, 16.0, 16.0, [0.0, 0.0, 1.0, 1.0], SpriteVertex::WHITE);
    assert!(batch.draw_sprite(Some(&texture), quad).unwrap());
    batch.end_draw(false).unwrap();
    assert_eq!(device.recorded_draw_count(), 1);
    assert_eq!(device.viewport(), viewport);

    let pixels = render_to_pixels(&ctx, &device, viewport);
    assert_eq!(pixel(&pixels, viewport, 16, 16), [255; 4]);
    assert_eq!(pixel(&pixels, viewport, 40, 40), [0, 0, 0, 255]);
}

#[test]
#[ignore] // Requires GPU
fn test_flushes_within_one_frame_are_all_rendered() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        return;
    };
    let viewport = Size::new(64, 64);
    let device = Arc::new(WgpuSpriteDevice::new(ctx.clone(), TARGET_FORMAT, viewport));
    let first = device.load_texture(&[255; 16], 2, 2).unwrap();
    let second = device.load_texture(&[255; 16], 2, 2).unwrap();
    let uv = [0.0, 0.0, 1.0, 1.0];

    // Capacity of one sprite forces the host to flush between the two quads.
    let mut batch = SpriteBatch::new(device.clone(), BatchConfig::default().with_max_sprites(1));
    batch.begin_draw().unwrap();
    let quad = SpriteVertex::quad(4.0, 4.0, 16.0, 16.0, uv, SpriteVertex::WHITE);
    assert!(batch.draw_sprite(Some(&first), quad).unwrap());
    batch.end_draw(false).unwrap();

    batch.begin_draw().unwrap();
    let quad = SpriteVertex::quad(40.0, 40.0, 16.0, 16.0, uv, SpriteVertex::WHITE);
    assert!(batch.draw_sprite(Some(&second), quad).unwrap());
    batch.end_draw(false).unwrap();
    assert_eq!(device.recorded_draw_count(), 2);

    let pixels = render_to_pixels(&ctx, &device, viewport);
    assert_eq!(pixel(&pixels, viewport, 12, 12), [255; 4]);
    assert_eq!(pixel(&pixels, viewport, 48, 48), [255; 4]);
    assert_eq!(pixel(&pixels, viewport, 30, 4), [0, 0, 0, 255]);

    // The next flush after a render starts a new frame.
    batch.begin_draw().unwrap();
    let quad = SpriteVertex::quad(40.0, 4.0, 16.0, 16.0, uv, SpriteVertex::WHITE);
    assert!(batch.draw_sprite(Some(&first), quad).unwrap());
    batch.end_draw(false).unwrap();
    assert_eq!(device.recorded_draw_count(), 1);

    let pixels = render_to_pixels(&ctx, &device, viewport);
    assert_eq!(pixel(&pixels, viewport, 48, 12), [255; 4]);
    assert_eq!(pixel(&pixels, viewport, 12, 12), [0, 0, 0, 255]);
}
