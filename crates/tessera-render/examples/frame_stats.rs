//! Runs a few frames against the recording device and prints batch stats.
//!
//! ```sh
//! RUST_LOG=trace cargo run -p tessera-render --example frame_stats --features mock
//! ```

use std::sync::Arc;

use tessera_core::geometry::Size;
use tessera_core::logging;
use tessera_core::profiling::{self, ProfilingBackend};
use tessera_render::{
    BatchConfig, BatchError, MockSpriteDevice, SpriteBatch, SpriteTexture, SpriteVertex, TextureId,
};

fn main() -> Result<(), BatchError> {
    logging::init();
    profiling::init_profiling(ProfilingBackend::InProcess);

    let device = Arc::new(MockSpriteDevice::new(Size::new(640, 480)));
    let mut batch = SpriteBatch::new(device.clone(), BatchConfig::default().with_max_sprites(1024));

    let terrain = SpriteTexture::new(TextureId::new(1), Size::new(44, 44));
    let statics = SpriteTexture::new(TextureId::new(2), Size::new(64, 64));

    for frame in 0..3 {
        device.clear_calls();
        batch.begin_draw()?;

        for row in 0..12 {
            for col in 0..16 {
                let x = col as f32 * 44.0 - frame as f32 * 20.0;
                let y = row as f32 * 44.0;
                let quad = SpriteVertex::quad(x, y, 44.0, 44.0, [0.0, 0.0, 1.0, 1.0], SpriteVertex::WHITE);
                batch.draw_sprite(Some(&terrain), quad)?;
            }
            // A static on every row breaks the terrain run.
            let quad = SpriteVertex::quad(100.0, row as f32 * 44.0, 64.0, 64.0, [0.0, 0.0, 1.0, 1.0], SpriteVertex::WHITE);
            batch.draw_sprite(Some(&statics), quad)?;
        }

        batch.end_draw(true)?;
        profiling::new_frame();
        let stats = batch.last_frame_stats();
        println!(
            "frame {frame}: {} submitted, {} accepted, {} culled, {} draws ({} merges), {} device calls",
            stats.sprites_submitted,
            stats.sprites_accepted,
            stats.sprites_culled,
            stats.draw_calls,
            stats.merges,
            device.call_count(),
        );
    }

    Ok(())
}
