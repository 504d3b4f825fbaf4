//! Plays a [`Scenario`] against a fresh engine.

use super::report::{LayoutReport, RegionReport, RegionState, Snapshot};
use super::{RegionSpec, Scenario, ScenarioError, Step};
use crate::config::EngineConfig;
use crate::layout::{LayoutEngine, Notification, RegionOptions};
use crate::model::{ContentView, LayoutError, RegionId, Size};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Regions registered for a run, keyed by label, in declaration order.
struct Registered {
    order: Vec<(String, RegionId)>,
    by_label: HashMap<String, RegionId>,
    rejected: Vec<(String, String)>,
}

impl Registered {
    fn lookup(&self, label: &str) -> Result<RegionId, ScenarioError> {
        self.by_label
            .get(label)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownLabel(label.to_string()))
    }
}

/// Run `scenario`: register its regions, take an initial snapshot, then apply
/// each step (followed by a scroll to each of `extra_offsets`) and snapshot
/// after every one.
///
/// Regions the engine rejects at registration are reported, not fatal.
///
/// # Errors
/// Steps naming unknown or rejected regions, and engine errors other than
/// registration rejections.
pub fn run(
    scenario: &Scenario,
    config: EngineConfig,
    extra_offsets: &[f64],
) -> Result<LayoutReport, ScenarioError> {
    info!(
        regions = scenario.regions.len(),
        steps = scenario.steps.len() + extra_offsets.len(),
        "running scenario"
    );
    let mut engine = LayoutEngine::new(config, scenario.viewport);

    let registered = if scenario.batch {
        engine.perform_batch_updates(
            |engine| register(engine, scenario),
            |status| debug!(?status, "registration batch finished"),
        )?
    } else {
        register(&mut engine, scenario)?
    };

    let mut snapshots = vec![snapshot(&engine, &registered, "initial".to_string())];

    let extra = extra_offsets
        .iter()
        .map(|offset| Step::Scroll { offset: *offset });
    for step in scenario.steps.iter().cloned().chain(extra) {
        apply(&mut engine, &registered, &step)?;
        snapshots.push(snapshot(&engine, &registered, step.to_string()));
    }

    Ok(LayoutReport {
        snapshots,
        rejected: registered.rejected,
        stats: engine.stats(),
    })
}

fn register(engine: &mut LayoutEngine, scenario: &Scenario) -> Result<Registered, LayoutError> {
    engine.set_content_insets(scenario.content_insets);

    let mut registered = Registered {
        order: Vec::with_capacity(scenario.regions.len()),
        by_label: HashMap::new(),
        rejected: Vec::new(),
    };
    for spec in &scenario.regions {
        match engine.add_region(spec.content(), options(spec)) {
            Ok(id) => {
                if let Some(background) = &spec.background {
                    engine.set_background(ContentView::plain(background.clone(), 0.0), id)?;
                }
                registered.order.push((spec.label.clone(), id));
                registered.by_label.insert(spec.label.clone(), id);
            }
            Err(LayoutError::Configuration(err)) => {
                warn!(label = %spec.label, error = %err, "region rejected");
                registered.rejected.push((spec.label.clone(), err.to_string()));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(registered)
}

fn options(spec: &RegionSpec) -> RegionOptions {
    RegionOptions {
        index: None,
        margins: spec.margins,
        padding: spec.padding,
        height_override: spec.height_override,
    }
}

fn apply(engine: &mut LayoutEngine, registered: &Registered, step: &Step) -> Result<(), ScenarioError> {
    debug!(%step, "applying step");
    match step {
        Step::Scroll { offset } => engine.set_content_offset(*offset),
        Step::Resize { region, height } => {
            let id = registered.lookup(region)?;
            let width = engine
                .real_content(id)
                .map_or(0.0, |content| content.size.width);
            engine.notify(Notification::ContentSizeChanged {
                region: id,
                size: Size::new(width, *height),
            });
        }
        Step::Hide { region } => engine.notify(Notification::VisibilityChanged {
            region: registered.lookup(region)?,
            hidden: true,
        }),
        Step::Show { region } => engine.notify(Notification::VisibilityChanged {
            region: registered.lookup(region)?,
            hidden: false,
        }),
        Step::Margins { region, margins } => {
            engine.set_margins(*margins, registered.lookup(region)?)?;
        }
        Step::Viewport { width, height } => engine.set_viewport(Size::new(*width, *height)),
    }
    Ok(())
}

fn snapshot(engine: &LayoutEngine, registered: &Registered, step: String) -> Snapshot {
    let regions = registered
        .order
        .iter()
        .map(|(label, id)| {
            let frame = engine.frame_for(*id);
            let state = if frame.is_none() {
                RegionState::Hidden
            } else if engine.is_fully_visible(*id) {
                RegionState::FullyVisible
            } else if engine.is_visible(*id) {
                RegionState::Visible
            } else {
                RegionState::Offscreen
            };
            RegionReport {
                label: label.clone(),
                kind: engine
                    .real_content(*id)
                    .map(|content| content.kind)
                    .unwrap_or_default(),
                frame,
                internal_offset: engine.internal_offset_for(*id),
                state,
            }
        })
        .collect();

    Snapshot {
        step,
        offset: engine.surface().content_offset(),
        content_size: engine.current_content_size(),
        regions,
    }
}
