//! Order-preserving adjacency merge of draw calls.

use super::types::DrawCall;

/// Collects a frame's draw calls, merging each into the previous one when
/// they share a texture.
///
/// Only the immediately preceding call is considered, so `A, B, A` stays
/// three calls. Merging across `B` would need a reorder, and reordering
/// breaks transparency compositing.
#[derive(Debug, Default)]
pub struct DrawCallMerger {
    calls: Vec<DrawCall>,
    merges: usize,
}

impl DrawCallMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a merger that can hold `capacity` calls without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            calls: Vec::with_capacity(capacity),
            merges: 0,
        }
    }

    /// Add a call, folding it into the last one when the textures match.
    #[inline]
    pub fn enqueue(&mut self, call: DrawCall) {
        if let Some(last) = self.calls.last_mut() {
            if last.try_merge(&call) {
                self.merges += 1;
                return;
            }
        }
        self.calls.push(call);
    }

    /// Merged calls in submission order.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Number of calls after merging.
    pub fn total_calls(&self) -> usize {
        self.calls.len()
    }

    /// Number of calls folded into a predecessor.
    pub fn total_merges(&self) -> usize {
        self.merges
    }

    pub fn total_primitives(&self) -> u64 {
        self.calls.iter().map(|c| c.primitive_count as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Make room for `capacity` calls. Called at frame boundaries only.
    pub fn reserve(&mut self, capacity: usize) {
        self.calls.reserve(capacity.saturating_sub(self.calls.len()));
    }

    /// Drop all calls and reset the merge counter, keeping the allocation.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.merges = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_test_utils::TextureId;

    fn call(texture: u64, start: u32, count: u32) -> DrawCall {
        DrawCall::new(TextureId::new(texture), start, count)
    }

    #[test]
    fn test_adjacent_calls_merge() {
        let mut merger = DrawCallMerger::new();
        merger.enqueue(call(1, 0, 2));
        merger.enqueue(call(1, 6, 2));
        merger.enqueue(call(1, 12, 2));

        assert_eq!(merger.calls(), &[call(1, 0, 6)]);
        assert_eq!(merger.total_merges(), 2);
        assert_eq!(merger.total_calls(), 1);
    }

    #[test]
    fn test_non_adjacent_calls_do_not_merge() {
        let mut merger = DrawCallMerger::new();
        merger.enqueue(call(1, 0, 2));
        merger.enqueue(call(2, 6, 2));
        merger.enqueue(call(1, 12, 2));

        assert_eq!(merger.calls(), &[call(1, 0, 2), call(2, 6, 2), call(1, 12, 2)]);
        assert_eq!(merger.total_merges(), 0);
    }

    #[test]
    fn test_merge_preserves_totals_and_order() {
        let textures = [3u64, 3, 1, 1, 1, 2, 3, 3, 2, 2, 2, 2, 1];
        let mut merger = DrawCallMerger::new();
        for (i, &texture) in textures.iter().enumerate() {
            merger.enqueue(call(texture, i as u32 * 6, 2));
        }

        assert_eq!(merger.total_primitives(), textures.len() as u64 * 2);
        assert_eq!(merger.total_calls() + merger.total_merges(), textures.len());

        // Expanding each merged call back into per-quad textures reproduces the input.
        let expanded: Vec<u64> = merger
            .calls()
            .iter()
            .flat_map(|c| std::iter::repeat_n(c.texture.raw(), (c.primitive_count / 2) as usize))
            .collect();
        assert_eq!(expanded, textures);

        // No two neighbours share a texture and starts never go backwards.
        for pair in merger.calls().windows(2) {
            assert_ne!(pair[0].texture, pair[1].texture);
            assert!(pair[0].start_index < pair[1].start_index);
            assert_eq!(pair[0].start_index + pair[0].index_count(), pair[1].start_index);
        }
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut merger = DrawCallMerger::with_capacity(4);
        merger.enqueue(call(1, 0, 2));
        merger.enqueue(call(1, 6, 2));
        merger.clear();
        assert!(merger.is_empty());
        assert_eq!(merger.total_merges(), 0);
    }
}
