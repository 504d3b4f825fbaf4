//! Property-based tests for stacking geometry.
//!
//! Heights and margins are whole numbers so every expected origin is exact and
//! unaffected by frame rounding.
//!
//! Properties Under Test:
//! - origins are prefix sums of heights
//! - a bottom margin `m` shifts region `i` by `i * m`
//! - hiding a region removes exactly its height
//! - a size change only recomputes the changed region and those after it
//! - an incremental reflow produces the same geometry as a full rebuild
//! - `layout_views()` is idempotent
//! - native regions start self-scrolling exactly one unit past their origin

use proptest::prelude::*;
use scrollstack::config::EngineConfig;
use scrollstack::layout::{LayoutEngine, Notification, RegionOptions};
use scrollstack::model::{ContentView, Insets, RegionId, Size};

const WIDTH: f64 = 400.0;

// ===== Arbitrary Strategies =====

fn arb_height() -> impl Strategy<Value = f64> {
    (0u32..600).prop_map(f64::from)
}

fn arb_positive_height() -> impl Strategy<Value = f64> {
    (1u32..600).prop_map(f64::from)
}

fn arb_viewport_height() -> impl Strategy<Value = f64> {
    (100u32..1000).prop_map(f64::from)
}

// ===== Helpers =====

fn build(heights: &[f64], viewport: f64, config: EngineConfig) -> (LayoutEngine, Vec<RegionId>) {
    let mut engine = LayoutEngine::new(config, Size::new(WIDTH, viewport));
    let ids = engine
        .perform_batch_updates(
            |engine| {
                heights
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        engine.add_region(
                            ContentView::plain(format!("r{i}"), *h),
                            RegionOptions::default(),
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()
            },
            |_| {},
        )
        .expect("plain regions register");
    (engine, ids)
}

fn origins(engine: &LayoutEngine, ids: &[RegionId]) -> Vec<f64> {
    ids.iter()
        .map(|id| engine.cache().entry_for(*id).expect("cached").origin().y)
        .collect()
}

fn geometry(engine: &LayoutEngine) -> Vec<(f64, f64)> {
    engine
        .cache()
        .entries()
        .iter()
        .map(|entry| (entry.origin().y, entry.content_size().height))
        .collect()
}

fn prefix_sums(heights: &[f64]) -> Vec<f64> {
    heights
        .iter()
        .scan(0.0, |acc, h| {
            let origin = *acc;
            *acc += h;
            Some(origin)
        })
        .collect()
}

// ===== Properties =====

proptest! {
    #[test]
    fn origins_are_prefix_sums(
        heights in prop::collection::vec(arb_height(), 1..20),
        viewport in arb_viewport_height(),
    ) {
        let (engine, ids) = build(&heights, viewport, EngineConfig::default());

        prop_assert_eq!(origins(&engine, &ids), prefix_sums(&heights));
        let total: f64 = heights.iter().sum();
        prop_assert_eq!(engine.current_content_size().height, total.max(viewport));
        prop_assert_eq!(engine.stats().full_rebuilds, 1);
    }

    #[test]
    fn bottom_margins_accumulate_linearly(
        heights in prop::collection::vec(arb_positive_height(), 1..20),
        margin in 0u32..50,
    ) {
        let margin = f64::from(margin);
        let (plain, plain_ids) = build(&heights, 500.0, EngineConfig::default());
        let spaced_config = EngineConfig {
            default_margins: Insets::bottom(margin),
            ..EngineConfig::default()
        };
        let (spaced, spaced_ids) = build(&heights, 500.0, spaced_config);

        let without = origins(&plain, &plain_ids);
        let with = origins(&spaced, &spaced_ids);
        for (i, (a, b)) in without.iter().zip(&with).enumerate() {
            prop_assert_eq!(b - a, i as f64 * margin);
        }
    }

    #[test]
    fn hiding_removes_exactly_one_height(
        heights in prop::collection::vec(arb_height(), 2..15),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut engine, ids) = build(&heights, 100.0, EngineConfig::default());
        let hidden = pick.index(heights.len());

        engine.set_hidden(ids[hidden], true).unwrap();

        let mut remaining = heights.clone();
        remaining.remove(hidden);
        let mut remaining_ids = ids.clone();
        remaining_ids.remove(hidden);
        prop_assert_eq!(origins(&engine, &remaining_ids), prefix_sums(&remaining));
        let total: f64 = remaining.iter().sum();
        prop_assert_eq!(engine.current_content_size().height, total.max(100.0));
    }

    #[test]
    fn size_change_is_local(
        heights in prop::collection::vec(arb_height(), 1..20),
        pick in any::<prop::sample::Index>(),
        new_height in arb_height(),
    ) {
        let (mut engine, ids) = build(&heights, 300.0, EngineConfig::default());
        let changed = pick.index(heights.len());
        let before = engine.cache().entries()[..changed].to_vec();
        let rebuilds = engine.stats().full_rebuilds;

        engine.notify(Notification::ContentSizeChanged {
            region: ids[changed],
            size: Size::new(0.0, new_height),
        });

        prop_assert_eq!(&engine.cache().entries()[..changed], before.as_slice());
        prop_assert_eq!(engine.stats().full_rebuilds, rebuilds);
        if heights[changed] != new_height {
            prop_assert_eq!(engine.stats().last_reflow_span, heights.len() - changed);
        }
    }

    #[test]
    fn reflow_agrees_with_rebuild(
        heights in prop::collection::vec(arb_height(), 1..20),
        top in 0u32..20,
        bottom in 0u32..20,
        pick in any::<prop::sample::Index>(),
        new_height in arb_height(),
    ) {
        let config = EngineConfig {
            default_margins: Insets::new(f64::from(top), 0.0, f64::from(bottom), 0.0),
            ..EngineConfig::default()
        };
        let (mut engine, ids) = build(&heights, 300.0, config);
        let changed = pick.index(heights.len());

        engine.notify(Notification::ContentSizeChanged {
            region: ids[changed],
            size: Size::new(0.0, new_height),
        });
        let reflowed = geometry(&engine);
        let reflowed_size = engine.current_content_size();

        engine.invalidate();
        engine.layout_views();

        prop_assert_eq!(reflowed, geometry(&engine));
        prop_assert_eq!(reflowed_size, engine.current_content_size());
    }

    #[test]
    fn layout_is_idempotent(
        heights in prop::collection::vec(arb_height(), 1..20),
        viewport in arb_viewport_height(),
        offset in 0u32..5000,
    ) {
        let (mut engine, ids) = build(&heights, viewport, EngineConfig::default());
        engine.set_content_offset(f64::from(offset));

        let frames: Vec<_> = ids.iter().map(|id| engine.frame_for(*id)).collect();
        let offsets: Vec<_> = ids.iter().map(|id| engine.internal_offset_for(*id)).collect();
        let writes = engine.stats().frame_writes;

        engine.layout_views();

        let frames_again: Vec<_> = ids.iter().map(|id| engine.frame_for(*id)).collect();
        let offsets_again: Vec<_> = ids.iter().map(|id| engine.internal_offset_for(*id)).collect();
        prop_assert_eq!(frames, frames_again);
        prop_assert_eq!(offsets, offsets_again);
        prop_assert_eq!(engine.stats().frame_writes, writes);
    }

    #[test]
    fn native_self_scroll_threshold(
        header in arb_height(),
        viewport in arb_viewport_height(),
        extra in 1u32..2000,
    ) {
        let mut engine = LayoutEngine::new(EngineConfig::default(), Size::new(WIDTH, viewport));
        engine
            .add_region(ContentView::plain("header", header), RegionOptions::default())
            .unwrap();
        let native = engine
            .add_region(
                ContentView::scrollable("list", viewport + f64::from(extra)),
                RegionOptions::default(),
            )
            .unwrap();

        engine.set_content_offset(header);
        prop_assert_eq!(engine.internal_offset_for(native), Some(0.0));
        prop_assert_eq!(engine.frame_for(native).unwrap().min_y(), header);

        engine.set_content_offset(header + 1.0);
        prop_assert_eq!(engine.internal_offset_for(native), Some(1.0));
        prop_assert_eq!(engine.frame_for(native).unwrap().height(), viewport);
    }
}
