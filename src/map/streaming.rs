//! Keeps the neighborhood around the local entity's map requested, loaded and pre-rendered.
//!
//! Two entry points share one walk over the neighborhood. [`check_strict`] is used while
//! loading and stops at the first gap. [`update_relaxed`] is used in game: it visits every
//! cell, asks the server for missing maps (throttled by the request table) and reports
//! whether the world can be shown. Both pre-render at most one map per call.

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::map::{Grid, MapId, MapInstanceCache};
use crate::platform::{Network, Renderer};

/// The first reason the neighborhood is not ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    /// The local entity has no map, or its map is not part of the grid.
    NoLocalMap,
    /// A neighbor has not been received at all.
    Missing(MapId),
    /// A neighbor is known but its payload has not arrived.
    NotLoaded(MapId),
    /// A neighbor was pre-rendered this frame; readiness is re-checked next frame.
    PreRendering(MapId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Waiting(Gap),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Outcome of one in-game pass over the neighborhood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridReport {
    /// Every in-bounds, non-empty neighbor is loaded, and rendered when caching.
    pub can_show_world: bool,
    /// Maps a "need map" request was sent for this frame.
    pub requested: SmallVec<[MapId; 9]>,
    /// The map pre-rendered this frame, if any.
    pub pre_rendered: Option<MapId>,
}

fn center_of(local_map: Option<MapId>, grid: &Grid) -> Option<glam::IVec2> {
    local_map.and_then(|id| grid.position_of(id))
}

/// Checks the neighborhood for the loading screen, returning at the first gap.
///
/// A map that still needs its render cache is pre-rendered here, after which the check
/// returns regardless of the outcome. No requests are ever sent.
pub fn check_strict(
    local_map: Option<MapId>,
    grid: &Grid,
    cache: &MapInstanceCache,
    renderer: &mut dyn Renderer,
    render_cache: bool,
) -> Readiness {
    let Some(center) = center_of(local_map, grid) else {
        return Readiness::Waiting(Gap::NoLocalMap);
    };

    for (_, id) in grid.neighborhood(center) {
        let Some(map) = cache.get(id) else {
            return Readiness::Waiting(Gap::Missing(id));
        };
        if !map.is_loaded() {
            return Readiness::Waiting(Gap::NotLoaded(id));
        }
        if render_cache && !map.is_rendered() {
            map.pre_render(renderer);
            return Readiness::Waiting(Gap::PreRendering(id));
        }
    }
    Readiness::Ready
}

/// Walks the whole neighborhood while in game.
///
/// Missing maps are requested when the request table allows it; the timestamp is only
/// recorded when the send succeeds. At most one map is pre-rendered.
pub fn update_relaxed(
    local_map: Option<MapId>,
    grid: &Grid,
    cache: &mut MapInstanceCache,
    network: &mut dyn Network,
    renderer: &mut dyn Renderer,
    render_cache: bool,
    now_ms: u64,
) -> GridReport {
    let mut report = GridReport::default();
    let Some(center) = center_of(local_map, grid) else {
        return report;
    };
    report.can_show_world = true;

    for (position, id) in grid.neighborhood(center) {
        match cache.get(id) {
            None => {
                report.can_show_world = false;
                if !cache.requests().can_request(id, now_ms) {
                    continue;
                }
                match network.send_need_map(id) {
                    Ok(()) => {
                        debug!(map = %id, ?position, "Requested missing map");
                        cache.requests_mut().record(id, now_ms);
                        report.requested.push(id);
                    }
                    Err(error) => warn!(map = %id, %error, "Failed to request map"),
                }
            }
            Some(map) if !map.is_loaded() => report.can_show_world = false,
            Some(map) if render_cache && !map.is_rendered() => {
                report.can_show_world = false;
                if report.pre_rendered.is_none() {
                    trace!(map = %id, "Pre-rendering neighbor");
                    map.pre_render(renderer);
                    report.pre_rendered = Some(id);
                }
            }
            Some(_) => {}
        }
    }
    report
}
