mod assets;
mod color;
mod declutter;
mod grid;
mod markers;
mod memo;
mod mesh;
mod normalize;
mod obj_io;
mod overlay;
mod parallel;
mod samples;
mod scene;
mod settings;
mod surface;

pub use assets::LoadError;
pub use color::{color_at, parse_color};
pub use declutter::{
    declutter, declutter_candidates, declutter_screen, Accepted, DeclutterCandidate, ScreenPoint,
    ViewState,
};
pub use grid::{build_grid, CellKey, DensityGrid, GridCell};
pub use markers::{load_markers, parse_markers_json, MarkerFamily, MarkerRecord, MarkerSet};
pub use memo::{DeclutterMemo, DirtyReason, MemoStats, OverlayInputs, OverlayMemo};
pub use mesh::{make_grid, Aabb, Mesh};
pub use normalize::{quantile, NormalizationConfig, TransformMode};
pub use obj_io::{load_obj_surface, load_obj_surface_bytes};
pub use overlay::{
    build_instances, build_overlay, OverlayBuild, OverlayInstance, OverlayParams, OverlayStats,
};
pub use samples::{load_samples, parse_samples_json, WeightedSample};
pub use scene::{scene_instances, scene_marker_kind, scene_markers};
pub use settings::{
    load_settings, parse_settings_json, MarkerSettings, OverlaySettings, SettingsError,
};
pub use surface::{SurfaceHit, SurfacePlacement, SurfaceProjector, SurfaceQuery};
