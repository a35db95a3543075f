use std::collections::BTreeMap;

use crate::samples::WeightedSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub i: i64,
    pub k: i64,
}

impl CellKey {
    pub fn new(i: i64, k: i64) -> Self {
        Self { i, k }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub sum: f64,
    pub max: f32,
    pub count: u32,
}

impl GridCell {
    fn first(density: f32) -> Self {
        Self {
            sum: density as f64,
            max: density,
            count: 1,
        }
    }

    fn accumulate(&mut self, density: f32) {
        self.sum += density as f64;
        self.max = self.max.max(density);
        self.count += 1;
    }

    pub fn avg(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f64) as f32
        }
    }
}

/// Plan-view density bins in scaled world space.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    cells: BTreeMap<CellKey, GridCell>,
    cell_size: f32,
}

impl DensityGrid {
    pub fn empty(cell_size: f32) -> Self {
        Self {
            cells: BTreeMap::new(),
            cell_size,
        }
    }

    /// Edge length of a cell after scaling.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, key: CellKey) -> Option<&GridCell> {
        self.cells.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellKey, &GridCell)> + '_ {
        self.cells.iter().map(|(key, cell)| (*key, cell))
    }

    pub fn averages(&self) -> Vec<f32> {
        self.cells.values().map(GridCell::avg).collect()
    }

    /// Center of a cell in scaled world `(x, z)`.
    pub fn cell_center(&self, key: CellKey) -> [f32; 2] {
        [
            (key.i as f32 + 0.5) * self.cell_size,
            (key.k as f32 + 0.5) * self.cell_size,
        ]
    }

    pub fn key_for(&self, x: f32, z: f32) -> CellKey {
        CellKey::new(
            (x / self.cell_size).floor() as i64,
            (z / self.cell_size).floor() as i64,
        )
    }
}

/// Bins samples into plan-view cells.
///
/// Both the sample coordinates and `cell_size` are multiplied by `scale`, so
/// the grid follows the render scale. One entry is allocated per occupied
/// cell; there is no upper bound on the cell count.
pub fn build_grid(samples: &[WeightedSample], cell_size: f32, scale: f32) -> DensityGrid {
    let mut grid = DensityGrid::empty(cell_size * scale);
    let mut skipped = 0usize;
    for sample in samples {
        if !sample.is_finite() {
            skipped += 1;
            continue;
        }
        let [x, z] = sample.plan_position();
        let key = grid.key_for(x * scale, z * scale);
        let density = sample.density.max(0.0);
        grid.cells
            .entry(key)
            .and_modify(|cell| cell.accumulate(density))
            .or_insert_with(|| GridCell::first(density));
    }
    if skipped > 0 {
        tracing::warn!("density grid: skipped {skipped} non-finite samples");
    }
    tracing::debug!(
        "density grid: {} samples into {} cells (cell size {})",
        samples.len() - skipped,
        grid.len(),
        grid.cell_size
    );
    grid
}
