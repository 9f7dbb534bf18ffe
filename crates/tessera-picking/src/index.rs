//! The run-length encoded opacity index.

use tessera_core::alloc::HashMap;
use tessera_core::geometry::Size;
use tessera_core::profiling::profile_function;

use crate::error::{PickingError, PickingResult};
use crate::varint;

/// Default initial capacity of the shared byte store.
pub const DEFAULT_CAPACITY: usize = 0x40000;

/// One decoded run of equally opaque pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub opaque: bool,
    /// Row-major pixel offset of the first pixel in the run.
    pub start: u64,
    pub len: u32,
}

impl Run {
    /// One past the last pixel offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.start + u64::from(self.len)
    }
}

/// Per-texture opacity maps for pixel-accurate hit testing.
///
/// Each texture is stored once, at load time, as two varints (width and
/// height) followed by alternating run lengths over the row-major pixels.
/// The first run is transparent and may be empty. All entries share one
/// append-only byte store; re-setting a texture points its entry at a fresh
/// encoding and leaves the old bytes in place until [`clear`](Self::clear).
///
/// ```
/// use tessera_picking::PixelPickingIndex;
///
/// let mut index = PixelPickingIndex::new();
/// index.set_mask(7, 4, 1, &[false, true, true, false])?;
///
/// assert!(index.get(7, 1, 0, 0));
/// assert!(!index.get(7, 0, 0, 0));
/// assert!(index.get(7, 0, 0, 1));
/// # Ok::<(), tessera_picking::PickingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PixelPickingIndex {
    bytes: Vec<u8>,
    entries: HashMap<u32, usize>,
}

impl Default for PixelPickingIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelPickingIndex {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an index whose byte store starts with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            entries: HashMap::default(),
        }
    }

    /// Encode 16-bit pixel samples. A sample of `0` is fully transparent.
    pub fn set(&mut self, texture_id: u32, width: u32, height: u32, samples: &[u16]) -> PickingResult<()> {
        let area = checked_area(width, height)?;
        check_len(area, samples.len())?;
        self.encode(texture_id, width, height, samples.iter().map(|&s| s != 0));
        Ok(())
    }

    /// Encode RGBA8 pixels. A pixel with alpha `0` is fully transparent.
    pub fn set_rgba(&mut self, texture_id: u32, width: u32, height: u32, rgba: &[u8]) -> PickingResult<()> {
        let area = checked_area(width, height)?;
        let expected = area
            .checked_mul(4)
            .ok_or(PickingError::DimensionsTooLarge { width, height })?;
        check_len(expected, rgba.len())?;
        self.encode(
            texture_id,
            width,
            height,
            rgba.chunks_exact(4).map(|pixel| pixel[3] != 0),
        );
        Ok(())
    }

    /// Encode a boolean mask where `true` is opaque.
    pub fn set_mask(&mut self, texture_id: u32, width: u32, height: u32, mask: &[bool]) -> PickingResult<()> {
        let area = checked_area(width, height)?;
        check_len(area, mask.len())?;
        self.encode(texture_id, width, height, mask.iter().copied());
        Ok(())
    }

    fn encode(&mut self, texture_id: u32, width: u32, height: u32, opaque: impl Iterator<Item = bool>) {
        profile_function!();
        let offset = self.bytes.len();
        varint::write(&mut self.bytes, width);
        varint::write(&mut self.bytes, height);

        let mut current = false;
        let mut run = 0u32;
        for pixel in opaque {
            if pixel == current {
                run += 1;
            } else {
                varint::write(&mut self.bytes, run);
                current = pixel;
                run = 1;
            }
        }
        varint::write(&mut self.bytes, run);

        if self.entries.insert(texture_id, offset).is_some() {
            tracing::trace!("Replaced picking entry for texture {texture_id}");
        }
        tracing::trace!(
            "Encoded picking entry for texture {texture_id} ({width}x{height}, {} bytes)",
            self.bytes.len() - offset
        );
    }

    /// Whether pixel `(x, y)` of the texture is opaque.
    ///
    /// With `tolerance > 0` the query also succeeds when an opaque pixel lies
    /// within `tolerance` rows and `tolerance` columns of `(x, y)`. Returns
    /// `false` for unknown textures and for coordinates outside the texture.
    pub fn get(&self, texture_id: u32, x: i32, y: i32, tolerance: u32) -> bool {
        let Some((size, runs)) = self.entry(texture_id) else {
            return false;
        };
        if x < 0 || y < 0 || x as u32 >= size.width || y as u32 >= size.height {
            return false;
        }
        let (x, y) = (u64::from(x as u32), u64::from(y as u32));
        let width = u64::from(size.width);

        if tolerance == 0 {
            let target = x + y * width;
            return runs
                .take_while(|run| run.start <= target)
                .any(|run| run.opaque && target < run.end());
        }

        let t = u64::from(tolerance);
        let first_row = y.saturating_sub(t);
        let last_row = y + t;
        let (min_x, max_x) = (x.saturating_sub(t), x + t);

        // Every opaque run is visited. Inside one run, its per-row spans
        // outside the row window are skipped.
        for run in runs.filter(|run| run.opaque && run.len > 0) {
            let mut pos = run.start.max(first_row * width);
            while pos < run.end() {
                let row = pos / width;
                if row > last_row {
                    break;
                }
                let row_end = run.end().min((row + 1) * width);
                let start_col = pos % width;
                let end_col = (row_end - 1) % width;
                if min_x <= end_col && max_x >= start_col {
                    return true;
                }
                pos = row_end;
            }
        }
        false
    }

    /// Width and height of the texture, or `0x0` if it is unknown.
    pub fn get_dimensions(&self, texture_id: u32) -> Size<u32> {
        self.entry(texture_id)
            .map(|(size, _)| size)
            .unwrap_or(Size::new(0, 0))
    }

    /// Decoded runs of the texture, in pixel order. Empty if unknown.
    pub fn runs(&self, texture_id: u32) -> Runs<'_> {
        match self.entry(texture_id) {
            Some((_, runs)) => runs,
            None => Runs::empty(),
        }
    }

    /// Check that the texture's entry decodes, alternates and covers exactly
    /// `width * height` pixels.
    pub fn verify(&self, texture_id: u32) -> PickingResult<()> {
        let (size, runs) = self
            .entry(texture_id)
            .ok_or(PickingError::UnknownTexture { texture_id })?;
        let expected = u64::from(size.width) * u64::from(size.height);

        let mut run_sum = 0u64;
        for (i, run) in runs.enumerate() {
            run_sum += u64::from(run.len);
            // Only the leading transparent run may be empty.
            if i > 0 && run.len == 0 {
                return Err(PickingError::Corrupt {
                    texture_id,
                    run_sum,
                    expected,
                });
            }
        }
        if run_sum != expected {
            return Err(PickingError::Corrupt {
                texture_id,
                run_sum,
                expected,
            });
        }
        Ok(())
    }

    pub fn contains(&self, texture_id: u32) -> bool {
        self.entries.contains_key(&texture_id)
    }

    /// Number of textures with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the byte store, including bytes orphaned by re-set entries.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Drop every entry and the byte store, keeping the allocation.
    pub fn clear(&mut self) {
        tracing::debug!(
            "Clearing picking index ({} entries, {} bytes)",
            self.entries.len(),
            self.bytes.len()
        );
        self.entries.clear();
        self.bytes.clear();
    }

    fn entry(&self, texture_id: u32) -> Option<(Size<u32>, Runs<'_>)> {
        let mut pos = *self.entries.get(&texture_id)?;
        let width = varint::read(&self.bytes, &mut pos);
        let height = varint::read(&self.bytes, &mut pos);
        debug_assert!(width.is_some() && height.is_some(), "truncated picking header");
        let size = Size::new(width?, height?);
        let total = u64::from(size.width) * u64::from(size.height);
        Some((size, Runs::new(&self.bytes, pos, total)))
    }
}

fn checked_area(width: u32, height: u32) -> PickingResult<usize> {
    width
        .checked_mul(height)
        .map(|area| area as usize)
        .ok_or(PickingError::DimensionsTooLarge { width, height })
}

fn check_len(expected: usize, actual: usize) -> PickingResult<()> {
    if expected != actual {
        return Err(PickingError::SampleCountMismatch { expected, actual });
    }
    Ok(())
}

/// Iterator over the decoded runs of one entry.
///
/// Stops once the runs cover the entry's pixel count, or early if the
/// encoding is truncated.
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    bytes: &'a [u8],
    pos: usize,
    total: u64,
    consumed: u64,
    opaque: bool,
    started: bool,
}

impl<'a> Runs<'a> {
    fn new(bytes: &'a [u8], pos: usize, total: u64) -> Self {
        Self {
            bytes,
            pos,
            total,
            consumed: 0,
            opaque: false,
            started: false,
        }
    }

    fn empty() -> Self {
        Self {
            bytes: &[],
            pos: 0,
            total: 0,
            consumed: 0,
            opaque: false,
            started: true,
        }
    }
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        if self.started && self.consumed >= self.total {
            return None;
        }
        let len = varint::read(self.bytes, &mut self.pos)?;
        let run = Run {
            opaque: if self.started { !self.opaque } else { false },
            start: self.consumed,
            len,
        };
        self.started = true;
        self.opaque = run.opaque;
        self.consumed += u64::from(len);
        Some(run)
    }
}
