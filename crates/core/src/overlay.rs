use glam::{Mat4, Quat, Vec3};

use crate::color::color_at;
use crate::grid::{build_grid, CellKey, DensityGrid};
use crate::normalize::NormalizationConfig;
use crate::parallel::map_ordered;
use crate::samples::WeightedSample;
use crate::surface::{SurfaceProjector, SurfaceQuery};

/// Display parameters for one overlay pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayParams {
    pub cell_size: f32,
    pub scale: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
    /// Gamma exponent applied to the normalized value.
    pub color_intensity: f32,
    pub color_scale_gain: f32,
    pub color_low: [f32; 3],
    pub color_high: [f32; 3],
    /// Lift along the surface normal, in render-space units.
    pub surface_offset: f32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            scale: 1.0,
            min_threshold: 0.0,
            max_threshold: 1.0,
            color_intensity: 1.0,
            color_scale_gain: 1.0,
            color_low: [0.0, 0.0, 1.0],
            color_high: [1.0, 0.0, 0.0],
            surface_offset: 0.02,
        }
    }
}

impl OverlayParams {
    pub fn passes_threshold(&self, value: f32) -> bool {
        value >= self.min_threshold && value <= self.max_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayInstance {
    pub cell: CellKey,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    pub color: [f32; 3],
}

impl OverlayInstance {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation, self.position)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub cells: usize,
    pub filtered: usize,
    pub missed: usize,
}

/// Complete result of one pass. Never handed out partially.
#[derive(Debug, Clone)]
pub struct OverlayBuild {
    pub instances: Vec<OverlayInstance>,
    pub normalization: NormalizationConfig,
    pub stats: OverlayStats,
}

impl OverlayBuild {
    pub fn empty() -> Self {
        Self {
            instances: Vec::new(),
            normalization: NormalizationConfig::default(),
            stats: OverlayStats::default(),
        }
    }
}

pub fn build_overlay<S: SurfaceQuery + ?Sized>(
    samples: &[WeightedSample],
    params: &OverlayParams,
    surface: &S,
) -> OverlayBuild {
    let grid = build_grid(samples, params.cell_size, params.scale);
    build_instances(&grid, params, surface)
}

/// Fits the normalizer over every cell, drops cells outside the display
/// thresholds, and ray casts only the survivors.
pub fn build_instances<S: SurfaceQuery + ?Sized>(
    grid: &DensityGrid,
    params: &OverlayParams,
    surface: &S,
) -> OverlayBuild {
    if grid.is_empty() {
        return OverlayBuild::empty();
    }
    let normalization = NormalizationConfig::fit(&grid.averages());
    let mut stats = OverlayStats {
        cells: grid.len(),
        ..Default::default()
    };

    let candidates: Vec<(CellKey, f32)> = grid
        .iter()
        .filter_map(|(key, cell)| {
            let value = normalization.normalize(
                cell.avg(),
                params.color_intensity,
                params.color_scale_gain,
            );
            params.passes_threshold(value).then_some((key, value))
        })
        .collect();
    stats.filtered = grid.len() - candidates.len();

    let cell_size = grid.cell_size();
    let Some(projector) = SurfaceProjector::new(surface, cell_size, params.surface_offset) else {
        stats.missed = candidates.len();
        tracing::debug!("overlay: target surface has no bounds, {} cells dropped", stats.missed);
        return OverlayBuild {
            instances: Vec::new(),
            normalization,
            stats,
        };
    };

    let placements = map_ordered(&candidates, |(key, _)| projector.project(grid.cell_center(*key)));
    let scale = Vec3::new(cell_size, 1.0, cell_size);
    let instances: Vec<OverlayInstance> = candidates
        .iter()
        .zip(placements)
        .filter_map(|((key, value), placement)| {
            let placement = placement?;
            Some(OverlayInstance {
                cell: *key,
                position: placement.position,
                orientation: placement.orientation,
                scale,
                color: color_at(*value, params.color_low, params.color_high),
            })
        })
        .collect();
    stats.missed = candidates.len() - instances.len();

    tracing::debug!(
        "overlay: {} cells, {} filtered, {} missed, {} instances ({:?})",
        stats.cells,
        stats.filtered,
        stats.missed,
        instances.len(),
        normalization.mode
    );

    OverlayBuild {
        instances,
        normalization,
        stats,
    }
}
