use std::path::PathBuf;
use std::process;

use glam::Vec3;
use heatlayer_core::{
    load_markers, load_obj_surface, load_samples, load_settings, make_grid, scene_instances,
    scene_markers, Aabb, DeclutterMemo, Mesh, OverlayInputs, OverlayMemo, OverlayParams,
    OverlaySettings, ViewState, WeightedSample,
};
use heatlayer_render::{camera_view_proj, CameraState, InstanceBatch, ResourceCache};
use heatlayer_scene::SceneSnapshot;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use crate::logging::parse_level;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeadlessArgs {
    pub samples_path: PathBuf,
    pub surface_path: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
    pub markers_path: Option<PathBuf>,
    /// `[yaw, pitch, distance]`; the target is always the surface center.
    pub camera: Option<[f32; 3]>,
    pub viewport: [f32; 2],
    pub log_level: LevelFilter,
    pub print: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunSummary {
    pub samples: usize,
    pub cells: usize,
    pub filtered: usize,
    pub missed: usize,
    pub instances: usize,
    pub normalization: NormalizationSummary,
    pub markers: Vec<MarkerSummary>,
    pub upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NormalizationSummary {
    pub lo: f32,
    pub hi: f32,
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MarkerSummary {
    pub family: String,
    pub total: usize,
    pub kept: usize,
}

pub(crate) fn parse_headless_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut samples_path = None;
    let mut surface_path = None;
    let mut settings_path = None;
    let mut markers_path = None;
    let mut camera = None;
    let mut viewport = [1280.0, 720.0];
    let mut log_level = LevelFilter::INFO;
    let mut print = false;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--samples" => samples_path = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--surface" => surface_path = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--settings" => settings_path = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--markers" => markers_path = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--camera" => camera = Some(parse_camera(required(&mut iter, arg)?)?),
            "--viewport" => viewport = parse_viewport(required(&mut iter, arg)?)?,
            "--log-level" => {
                let value = required(&mut iter, arg)?;
                log_level =
                    parse_level(value).ok_or_else(|| format!("unknown log level '{value}'"))?;
            }
            "--print" => print = true,
            "--help" | "-h" => {
                print_headless_help();
                process::exit(0);
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    let samples_path = samples_path.ok_or_else(|| "--samples is required".to_string())?;
    Ok(HeadlessArgs {
        samples_path,
        surface_path,
        settings_path,
        markers_path,
        camera,
        viewport,
        log_level,
        print,
    })
}

fn required<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, String> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_camera(value: &str) -> Result<[f32; 3], String> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|err| format!("--camera: {err}"))?;
    match parts.as_slice() {
        [yaw, pitch, distance] if parts.iter().all(|v| v.is_finite()) && *distance > 0.0 => {
            Ok([*yaw, *pitch, *distance])
        }
        _ => Err(format!(
            "--camera expects yaw,pitch,distance with distance > 0, got '{value}'"
        )),
    }
}

fn parse_viewport(value: &str) -> Result<[f32; 2], String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("--viewport expects WxH, got '{value}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|err| format!("--viewport width: {err}"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|err| format!("--viewport height: {err}"))?;
    if width == 0 || height == 0 {
        return Err("--viewport dimensions must be non-zero".to_string());
    }
    Ok([width as f32, height as f32])
}

fn print_headless_help() {
    println!(
        "heatlayer --samples <json> [--surface <obj>] [--settings <json>] [--markers <json>]\n\
         \x20         [--camera yaw,pitch,distance] [--viewport WxH] [--log-level L] [--print]\n\n\
         Bins weighted samples into a density grid, drapes the colored cells over the\n\
         surface and declutters marker sets for the given camera."
    );
}

pub(crate) fn run_headless(args: &HeadlessArgs) -> Result<RunSummary, String> {
    let samples = load_samples(&args.samples_path).map_err(|err| err.to_string())?;
    let settings = match &args.settings_path {
        Some(path) => load_settings(path).map_err(|err| err.to_string())?,
        None => OverlaySettings::default(),
    };
    let params = settings.to_params().map_err(|err| err.to_string())?;
    tracing::info!(
        "headless: {} samples, cell size {}, scale {}",
        samples.len(),
        params.cell_size,
        params.scale
    );

    let mut surfaces: ResourceCache<PathBuf, Mesh> = ResourceCache::new();
    let fallback;
    let surface: &Mesh = match &args.surface_path {
        Some(path) => surfaces
            .get_or_try_insert_with(path.clone(), || load_obj_surface(path))
            .map_err(|err| err.to_string())?,
        None => {
            fallback = flat_surface(&samples, &params);
            &fallback
        }
    };
    let bounds = surface
        .bounds()
        .ok_or_else(|| "surface has no vertices".to_string())?;

    let mut overlay = OverlayMemo::new();
    let build = overlay.update(
        OverlayInputs {
            samples_version: 1,
            geometry_version: 1,
        },
        &samples,
        surface,
        &params,
    );

    let mut snapshot = SceneSnapshot {
        heatmap: scene_instances(&build.instances),
        ..Default::default()
    };
    let mut batch = InstanceBatch::new();
    let update = batch.apply(&snapshot.heatmap);
    let (transform_bytes, color_bytes) = batch.take_dirty();
    let upload_bytes =
        transform_bytes.map_or(0, <[u8]>::len) + color_bytes.map_or(0, <[u8]>::len);
    tracing::debug!("headless: instance batch {:?}, {} bytes", update, upload_bytes);

    let camera = camera_for(&bounds, args.camera);
    let view = ViewState::new(
        camera_view_proj(camera, args.viewport),
        args.viewport[0],
        args.viewport[1],
    );

    let mut marker_summaries = Vec::new();
    if let Some(path) = &args.markers_path {
        let sets = load_markers(path).map_err(|err| err.to_string())?;
        for set in sets {
            let set = set.scaled(params.scale);
            let mut memo = DeclutterMemo::new();
            let accepted = memo.update(1, &set, &view, &settings.markers);
            marker_summaries.push(MarkerSummary {
                family: format!("{:?}", set.family),
                total: set.len(),
                kept: accepted.len(),
            });
            snapshot.markers.push(scene_markers(&set, accepted));
        }
    }

    let summary = RunSummary {
        samples: samples.len(),
        cells: build.stats.cells,
        filtered: build.stats.filtered,
        missed: build.stats.missed,
        instances: build.instances.len(),
        normalization: NormalizationSummary {
            lo: build.normalization.lo,
            hi: build.normalization.hi,
            mode: format!("{:?}", build.normalization.mode),
        },
        markers: marker_summaries,
        upload_bytes,
    };
    tracing::info!(
        "headless: {} cells, {} instances ({} filtered, {} missed), {} markers kept",
        summary.cells,
        summary.instances,
        summary.filtered,
        summary.missed,
        snapshot.marker_count()
    );

    batch.dispose();
    let released = surfaces.dispose_all();
    tracing::debug!("headless: released {} cached surfaces", released);
    Ok(summary)
}

/// Single-quad ground plane covering the scaled sample footprint plus one
/// cell of margin.
fn flat_surface(samples: &[WeightedSample], params: &OverlayParams) -> Mesh {
    let cell = params.cell_size * params.scale;
    let mut min = [f32::INFINITY; 2];
    let mut max = [f32::NEG_INFINITY; 2];
    for sample in samples.iter().filter(|sample| sample.is_finite()) {
        let [x, z] = sample.plan_position();
        let (x, z) = (x * params.scale, z * params.scale);
        min = [min[0].min(x), min[1].min(z)];
        max = [max[0].max(x), max[1].max(z)];
    }
    if !min[0].is_finite() {
        return make_grid([cell, cell], [1, 1]);
    }

    let size = [max[0] - min[0] + 2.0 * cell, max[1] - min[1] + 2.0 * cell];
    let mut mesh = make_grid(size, [1, 1]);
    mesh.translate(Vec3::new(
        (min[0] + max[0]) * 0.5,
        0.0,
        (min[1] + max[1]) * 0.5,
    ));
    mesh
}

fn camera_for(bounds: &Aabb, orbit: Option<[f32; 3]>) -> CameraState {
    let center = (Vec3::from(bounds.min) + Vec3::from(bounds.max)) * 0.5;
    let default = CameraState::default();
    let [yaw, pitch, distance] = orbit.unwrap_or([
        default.yaw,
        default.pitch,
        (bounds.size().length() * 1.5).max(1.0),
    ]);
    CameraState {
        target: center.to_array(),
        distance,
        yaw,
        pitch,
    }
}

pub(crate) fn print_summary(summary: &RunSummary) -> Result<(), String> {
    let json = serde_json::to_string_pretty(summary).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}
