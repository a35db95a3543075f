use std::hash::{Hash, Hasher};

use crate::declutter::{Accepted, ViewState};
use crate::grid::{build_grid, DensityGrid};
use crate::markers::MarkerSet;
use crate::overlay::{build_instances, OverlayBuild, OverlayParams};
use crate::samples::WeightedSample;
use crate::settings::MarkerSettings;
use crate::surface::SurfaceQuery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyReason {
    First,
    GridChanged,
    GeometryChanged,
    DisplayChanged,
}

/// Caller-owned identities for the inputs of an overlay pass. Bump a version
/// whenever the corresponding data is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayInputs {
    pub samples_version: u64,
    pub geometry_version: u64,
}

#[derive(Debug)]
struct GridStage {
    signature: u64,
    version: u64,
    grid: DensityGrid,
}

#[derive(Debug)]
struct InstanceStage {
    grid_version: u64,
    geometry_version: u64,
    display_signature: u64,
    build: OverlayBuild,
}

/// Two-stage cache for overlay passes: binning reruns only when samples,
/// cell size or scale change; fitting and ray casting rerun when the grid,
/// geometry or display parameters change.
#[derive(Debug, Default)]
pub struct OverlayMemo {
    grid: Option<GridStage>,
    instances: Option<InstanceStage>,
    output_version: u64,
    last_dirty: Option<DirtyReason>,
    pub stats: MemoStats,
}

impl OverlayMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments each time a new build is produced.
    pub fn output_version(&self) -> u64 {
        self.output_version
    }

    /// Why the most recent update rebuilt, or `None` if it was a cache hit.
    pub fn last_dirty(&self) -> Option<DirtyReason> {
        self.last_dirty
    }

    pub fn current(&self) -> Option<&OverlayBuild> {
        self.instances.as_ref().map(|stage| &stage.build)
    }

    pub fn update<S: SurfaceQuery + ?Sized>(
        &mut self,
        inputs: OverlayInputs,
        samples: &[WeightedSample],
        surface: &S,
        params: &OverlayParams,
    ) -> &OverlayBuild {
        let grid_signature = hash_grid_signature(inputs.samples_version, params);
        let grid_stage = match self.grid.take() {
            Some(stage) if stage.signature == grid_signature => stage,
            previous => GridStage {
                signature: grid_signature,
                version: previous.map_or(0, |stage| stage.version + 1),
                grid: build_grid(samples, params.cell_size, params.scale),
            },
        };
        let grid_stage = self.grid.insert(grid_stage);

        let display_signature = hash_display_signature(params);
        let reason = match &self.instances {
            None => Some(DirtyReason::First),
            Some(stage) if stage.grid_version != grid_stage.version => {
                Some(DirtyReason::GridChanged)
            }
            Some(stage) if stage.geometry_version != inputs.geometry_version => {
                Some(DirtyReason::GeometryChanged)
            }
            Some(stage) if stage.display_signature != display_signature => {
                Some(DirtyReason::DisplayChanged)
            }
            Some(_) => None,
        };
        self.last_dirty = reason;

        match (reason, self.instances.take()) {
            (None, Some(stage)) => {
                self.stats.hits += 1;
                &self.instances.insert(stage).build
            }
            _ => {
                let build = build_instances(&grid_stage.grid, params, surface);
                tracing::debug!(
                    "overlay memo: rebuilt ({:?}), {} instances",
                    reason,
                    build.instances.len()
                );
                let stage = InstanceStage {
                    grid_version: grid_stage.version,
                    geometry_version: inputs.geometry_version,
                    display_signature,
                    build,
                };
                self.output_version = self.output_version.wrapping_add(1);
                self.stats.misses += 1;
                &self.instances.insert(stage).build
            }
        }
    }
}

/// Per-family declutter cache keyed by camera, viewport, threshold and the
/// marker set version. Geometry changes never touch it.
#[derive(Debug, Default)]
pub struct DeclutterMemo {
    signature: Option<u64>,
    accepted: Vec<Accepted>,
    pub stats: MemoStats,
}

impl DeclutterMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        markers_version: u64,
        markers: &MarkerSet,
        view: &ViewState,
        settings: &MarkerSettings,
    ) -> &[Accepted] {
        let signature = hash_view_signature(
            markers_version,
            view,
            markers.family.threshold_px(settings),
        );
        if self.signature == Some(signature) {
            self.stats.hits += 1;
        } else {
            self.accepted = markers.declutter(view, settings);
            self.signature = Some(signature);
            self.stats.misses += 1;
            tracing::trace!(
                "declutter {:?}: kept {} of {}",
                markers.family,
                self.accepted.len(),
                markers.len()
            );
        }
        &self.accepted
    }
}

fn hash_grid_signature(samples_version: u64, params: &OverlayParams) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    samples_version.hash(&mut hasher);
    params.cell_size.to_bits().hash(&mut hasher);
    params.scale.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn hash_display_signature(params: &OverlayParams) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for value in [
        params.min_threshold,
        params.max_threshold,
        params.color_intensity,
        params.color_scale_gain,
        params.surface_offset,
    ] {
        value.to_bits().hash(&mut hasher);
    }
    for channel in params.color_low.iter().chain(params.color_high.iter()) {
        channel.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

fn hash_view_signature(markers_version: u64, view: &ViewState, threshold_px: f32) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    markers_version.hash(&mut hasher);
    for value in view.view_proj.to_cols_array() {
        value.to_bits().hash(&mut hasher);
    }
    view.viewport[0].to_bits().hash(&mut hasher);
    view.viewport[1].to_bits().hash(&mut hasher);
    threshold_px.to_bits().hash(&mut hasher);
    hasher.finish()
}
