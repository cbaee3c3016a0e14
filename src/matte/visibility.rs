//! The set of IDs that actually occur in an image.

use std::collections::HashSet;

use super::buffers::ChannelStack;
use super::id::ObjectId;

/// Collects every distinct value found in the ID channels (even indices).
pub fn compute_visible_ids(stack: &ChannelStack) -> HashSet<ObjectId> {
    let ranks = stack.rank_count();
    let mut visible = HashSet::new();
    for pixel in stack.pixels() {
        for rank in 0..ranks {
            visible.insert(ObjectId::from_f32(pixel[rank * 2]));
        }
    }
    visible
}

/// Membership pre-check in front of mask composition.
///
/// An ID missing from the index would produce an all-zero mask, so callers
/// can skip composing it. Skipping never changes the result.
#[derive(Clone, Debug, Default)]
pub struct VisibilityIndex {
    ids: HashSet<ObjectId>,
}

impl VisibilityIndex {
    pub fn build(stack: &ChannelStack) -> Self {
        Self {
            ids: compute_visible_ids(stack),
        }
    }

    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
