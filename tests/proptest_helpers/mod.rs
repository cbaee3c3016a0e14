#![allow(dead_code)]

use kriptomatte::matte::{ChannelStack, LabelMap, Mask};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A small pool of IDs so that generated stacks actually repeat them.
pub const ID_POOL: [f32; 5] = [0.0, 1.0, 2.0, -3.5, 1.0e-20];

pub fn arb_dims(max: u32) -> impl Strategy<Value = (u32, u32)> {
    (1..=max, 1..=max)
}

/// A channel stack with `ranks` (ID, coverage) pairs drawn from [`ID_POOL`].
pub fn arb_stack(max_dim: u32, max_ranks: usize) -> impl Strategy<Value = ChannelStack> {
    (arb_dims(max_dim), 0..=max_ranks).prop_flat_map(|((h, w), ranks)| {
        let pixels = (h * w) as usize;
        let channel = (prop::sample::select(ID_POOL.to_vec()), 0.0f32..=1.0f32);
        prop::collection::vec(prop::collection::vec(channel, ranks), pixels).prop_map(
            move |pixels| {
                let data = pixels
                    .into_iter()
                    .flat_map(|ranks| ranks.into_iter().flat_map(|(id, cov)| [id, cov]))
                    .collect();
                ChannelStack::new(h, w, ranks * 2, data).expect("generated stack")
            },
        )
    })
}

pub fn arb_mask(h: u32, w: u32) -> impl Strategy<Value = Mask> {
    prop::collection::vec(any::<u8>(), (h * w) as usize)
        .prop_map(move |data| Mask::from_vec(h, w, data).expect("generated mask"))
}

/// Between one and `max_masks` masks of a common size.
pub fn arb_masks(max_dim: u32, max_masks: usize) -> impl Strategy<Value = (u32, u32, Vec<Mask>)> {
    arb_dims(max_dim).prop_flat_map(move |(h, w)| {
        prop::collection::vec(arb_mask(h, w), 1..=max_masks).prop_map(move |masks| (h, w, masks))
    })
}

pub fn arb_label_map(max_dim: u32, max_label: u32) -> impl Strategy<Value = LabelMap> {
    arb_dims(max_dim).prop_flat_map(move |(h, w)| {
        prop::collection::vec(0..=max_label, (h * w) as usize)
            .prop_map(move |labels| LabelMap::from_vec(h, w, labels).expect("generated labels"))
    })
}
