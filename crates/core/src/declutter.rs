use glam::{Mat4, Vec3, Vec4};

const MIN_CLIP_W: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub px: f32,
    pub py: f32,
}

impl ScreenPoint {
    pub fn distance_squared(&self, other: &ScreenPoint) -> f32 {
        let dx = self.px - other.px;
        let dy = self.py - other.py;
        dx * dx + dy * dy
    }
}

/// Camera view-projection plus viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub view_proj: Mat4,
    pub viewport: [f32; 2],
}

impl ViewState {
    pub fn new(view_proj: Mat4, width: f32, height: f32) -> Self {
        Self {
            view_proj,
            viewport: [width, height],
        }
    }

    /// Pixel position with the origin at the top-left corner. `None` for
    /// points at or behind the camera plane.
    pub fn project(&self, world: Vec3) -> Option<ScreenPoint> {
        let clip = self.view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= MIN_CLIP_W {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let point = ScreenPoint {
            px: (ndc_x + 1.0) * 0.5 * self.viewport[0],
            py: (1.0 - ndc_y) * 0.5 * self.viewport[1],
        };
        (point.px.is_finite() && point.py.is_finite()).then_some(point)
    }
}

/// A marker waiting to be decluttered.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclutterCandidate<M> {
    pub world_position: Vec3,
    pub id: u64,
    pub metadata: M,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accepted {
    pub index: usize,
    pub screen: ScreenPoint,
}

/// Greedy screen-space thinning in input order.
///
/// A candidate is accepted unless it lands closer than `threshold_px` to a
/// previously accepted one, so earlier entries always win. Quadratic in the
/// number of accepted points.
pub fn declutter_screen<T, F>(
    points: &[T],
    position_of: F,
    view: &ViewState,
    threshold_px: f32,
) -> Vec<Accepted>
where
    F: Fn(&T) -> Vec3,
{
    let threshold_sq = threshold_px * threshold_px;
    let mut accepted: Vec<Accepted> = Vec::new();
    for (index, point) in points.iter().enumerate() {
        let Some(screen) = view.project(position_of(point)) else {
            continue;
        };
        let crowded = accepted
            .iter()
            .any(|kept| kept.screen.distance_squared(&screen) < threshold_sq);
        if !crowded {
            accepted.push(Accepted { index, screen });
        }
    }
    accepted
}

/// Same as [`declutter_screen`] but hands back the surviving elements.
pub fn declutter<'a, T, F>(
    points: &'a [T],
    position_of: F,
    view: &ViewState,
    threshold_px: f32,
) -> Vec<&'a T>
where
    F: Fn(&T) -> Vec3,
{
    declutter_screen(points, position_of, view, threshold_px)
        .into_iter()
        .map(|accepted| &points[accepted.index])
        .collect()
}

pub fn declutter_candidates<'a, M>(
    candidates: &'a [DeclutterCandidate<M>],
    view: &ViewState,
    threshold_px: f32,
) -> Vec<&'a DeclutterCandidate<M>> {
    declutter(candidates, |c| c.world_position, view, threshold_px)
}
