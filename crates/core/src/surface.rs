use glam::{Quat, Vec3};

use crate::mesh::{Aabb, Mesh};

/// Read-only ray query surface the overlay is projected onto.
pub trait SurfaceQuery: Sync {
    fn bounds(&self) -> Option<Aabb>;

    /// Closest hit along `dir` (unit length) from `origin`, if any.
    fn cast_ray(&self, origin: Vec3, dir: Vec3) -> Option<SurfaceHit>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub position: Vec3,
    /// Face normal; `None` when the hit face has no usable normal.
    pub normal: Option<Vec3>,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePlacement {
    pub position: Vec3,
    pub normal: Vec3,
    pub orientation: Quat,
}

impl SurfaceQuery for Mesh {
    fn bounds(&self) -> Option<Aabb> {
        Mesh::bounds(self)
    }

    fn cast_ray(&self, origin: Vec3, dir: Vec3) -> Option<SurfaceHit> {
        let mut best: Option<SurfaceHit> = None;
        for tri_index in 0..self.triangle_count() {
            let Some([a, b, c]) = self.triangle(tri_index) else {
                continue;
            };
            let Some(t) = ray_triangle_intersect(origin, dir, a, b, c) else {
                continue;
            };
            if t < 0.0 {
                continue;
            }
            if best.as_ref().is_some_and(|hit| hit.distance <= t) {
                continue;
            }
            best = Some(SurfaceHit {
                position: origin + dir * t,
                normal: triangle_normal(a, b, c),
                distance: t,
            });
        }
        best
    }
}

fn ray_triangle_intersect(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let eps = 1.0e-6;
    let edge_eps = 1.0e-5;
    let edge1 = b - a;
    let edge2 = c - a;
    let h = dir.cross(edge2);
    let det = edge1.dot(h);
    // Cutoff relative to the triangle's edge lengths.
    if det.abs() <= eps * edge1.length() * edge2.length() {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(h) * inv_det;
    if !(-edge_eps..=1.0 + edge_eps).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    // Shared edges count for both triangles.
    if v < -edge_eps || u + v > 1.0 + edge_eps {
        return None;
    }
    Some(edge2.dot(q) * inv_det)
}

fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    (b - a).cross(c - a).try_normalize()
}

/// Drops flat decals onto a surface with straight-down ray casts.
pub struct SurfaceProjector<'a, S: SurfaceQuery + ?Sized> {
    surface: &'a S,
    origin_height: f32,
    offset: f32,
}

impl<'a, S: SurfaceQuery + ?Sized> SurfaceProjector<'a, S> {
    /// Returns `None` when the surface has no bounds (nothing to hit).
    /// Rays start `4 * cell_size` above the top of the surface bounds.
    pub fn new(surface: &'a S, cell_size: f32, offset: f32) -> Option<Self> {
        let bounds = surface.bounds()?;
        Some(Self {
            surface,
            origin_height: bounds.max[1] + 4.0 * cell_size.abs(),
            offset,
        })
    }

    pub fn origin_height(&self) -> f32 {
        self.origin_height
    }

    /// Misses and degenerate hits both yield `None`.
    pub fn project(&self, center_xz: [f32; 2]) -> Option<SurfacePlacement> {
        let origin = Vec3::new(center_xz[0], self.origin_height, center_xz[1]);
        let dir = Vec3::NEG_Y;
        let hit = self.surface.cast_ray(origin, dir)?;
        let mut normal = hit.normal?;
        if !hit.position.is_finite() || !normal.is_finite() {
            return None;
        }
        // Face the decal back toward the ray origin regardless of winding.
        if normal.dot(dir) > 0.0 {
            normal = -normal;
        }
        let orientation = Quat::from_rotation_arc(Vec3::Y, normal);
        Some(SurfacePlacement {
            position: hit.position + normal * self.offset,
            normal,
            orientation,
        })
    }
}
