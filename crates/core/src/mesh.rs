use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min[0] && x <= self.max[0] && z >= self.min[2] && z <= self.max[2]
    }

    pub fn size(&self) -> Vec3 {
        Vec3::from(self.max) - Vec3::from(self.min)
    }
}

/// Indexed triangle mesh used as a projection target.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions_indices(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let mut iter = self.positions.iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;

        for p in iter {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            min[2] = min[2].min(p[2]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
            max[2] = max[2].max(p[2]);
        }

        Some(Aabb { min, max })
    }

    pub fn triangle(&self, tri_index: usize) -> Option<[Vec3; 3]> {
        let tri = self.indices.get(tri_index * 3..tri_index * 3 + 3)?;
        let a = Vec3::from(*self.positions.get(tri[0] as usize)?);
        let b = Vec3::from(*self.positions.get(tri[1] as usize)?);
        let c = Vec3::from(*self.positions.get(tri[2] as usize)?);
        Some([a, b, c])
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from(*p) + offset).to_array();
        }
    }
}

/// Flat XZ grid centered on the origin at `y = 0`, wound so faces point up.
pub fn make_grid(size: [f32; 2], divisions: [u32; 2]) -> Mesh {
    let width = size[0].max(0.0);
    let depth = size[1].max(0.0);
    let div_x = divisions[0].max(1);
    let div_z = divisions[1].max(1);

    let step_x = width / div_x as f32;
    let step_z = depth / div_z as f32;
    let origin_x = -width * 0.5;
    let origin_z = -depth * 0.5;

    let mut positions = Vec::new();
    for z in 0..=div_z {
        for x in 0..=div_x {
            positions.push([
                origin_x + x as f32 * step_x,
                0.0,
                origin_z + z as f32 * step_z,
            ]);
        }
    }

    let mut indices = Vec::new();
    let stride = div_x + 1;
    for z in 0..div_z {
        for x in 0..div_x {
            let i0 = z * stride + x;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    Mesh::with_positions_indices(positions, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_for_simple_points() {
        let mesh =
            Mesh::with_positions_indices(vec![[1.0, -2.0, 0.5], [-3.0, 4.0, 2.0]], vec![0, 1, 0]);
        let bounds = mesh.bounds().expect("bounds");
        assert_eq!(bounds.min, [-3.0, -2.0, 0.5]);
        assert_eq!(bounds.max, [1.0, 4.0, 2.0]);
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn grid_has_expected_counts() {
        let mesh = make_grid([2.0, 2.0], [2, 3]);
        assert_eq!(mesh.positions.len(), (2 + 1) * (3 + 1));
        assert_eq!(mesh.triangle_count(), 2 * 3 * 2);
    }

    #[test]
    fn grid_faces_point_up() {
        let mesh = make_grid([2.0, 2.0], [1, 1]);
        for tri in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(tri).expect("triangle");
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn translate_moves_bounds() {
        let mut mesh = make_grid([2.0, 2.0], [1, 1]);
        mesh.translate(Vec3::new(1.0, 5.0, -1.0));
        let bounds = mesh.bounds().expect("bounds");
        assert_eq!(bounds.min, [0.0, 5.0, -2.0]);
        assert_eq!(bounds.max, [2.0, 5.0, 0.0]);
        assert!(bounds.contains_xz(1.0, -1.0));
        assert!(!bounds.contains_xz(3.0, -1.0));
    }

    #[test]
    fn triangle_out_of_range_is_none() {
        let mesh = make_grid([1.0, 1.0], [2, 2]);
        assert!(mesh.triangle(8).is_none());
        assert!(mesh.triangle(7).is_some());
    }
}
