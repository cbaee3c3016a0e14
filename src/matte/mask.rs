//! Per-object mask composition.

use super::buffers::{ChannelStack, Mask};
use super::id::ObjectId;

/// Coverage contributed by one rank: the coverage channel where the ID
/// channel equals `id`, zero elsewhere.
///
/// Returns all zeros when the stack has no such rank.
pub fn coverage_for_rank(id: ObjectId, stack: &ChannelStack, rank: usize) -> Vec<f32> {
    if rank * 2 + 1 >= stack.channels() {
        return vec![0.0; stack.pixel_count()];
    }
    stack
        .pixels()
        .map(|pixel| {
            if ObjectId::from_f32(pixel[rank * 2]) == id {
                pixel[rank * 2 + 1]
            } else {
                0.0
            }
        })
        .collect()
}

/// Accumulates the coverage of `id` over all ranks into an 8-bit mask.
///
/// Per pixel the matching coverages are summed, clamped to `[0, 1]`,
/// multiplied by 255 and truncated.
pub fn compute_mask(id: ObjectId, stack: &ChannelStack) -> Mask {
    let ranks = stack.rank_count();
    if ranks == 0 {
        return Mask::zeros(stack.height(), stack.width());
    }

    let data = stack
        .pixels()
        .map(|pixel| {
            let mut coverage = 0.0f32;
            for rank in 0..ranks {
                if ObjectId::from_f32(pixel[rank * 2]) == id {
                    coverage += pixel[rank * 2 + 1];
                }
            }
            coverage_to_byte(coverage)
        })
        .collect();

    Mask::from_vec(stack.height(), stack.width(), data)
        .unwrap_or_else(|_| Mask::zeros(stack.height(), stack.width()))
}

#[inline]
fn coverage_to_byte(coverage: f32) -> u8 {
    // `as` truncates toward zero and maps NaN to 0.
    (coverage.clamp(0.0, 1.0) * 255.0) as u8
}

/// Per-pixel maximum over several masks of equal size.
///
/// Returns `None` for an empty list or when sizes differ.
pub fn combine_max(masks: &[Mask]) -> Option<Mask> {
    let first = masks.first()?;
    if masks.iter().any(|m| !m.same_size(first)) {
        return None;
    }
    let mut data = first.as_slice().to_vec();
    for mask in &masks[1..] {
        for (acc, value) in data.iter_mut().zip(mask.as_slice()) {
            *acc = (*acc).max(*value);
        }
    }
    Mask::from_vec(first.height(), first.width(), data).ok()
}
