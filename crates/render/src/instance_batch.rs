use bytemuck::{Pod, Zeroable};
use heatlayer_scene::SceneInstances;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    pub columns: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceColor {
    pub rgb: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchUpdate {
    /// Count changed; storage was replaced and the old buffers disposed.
    Reallocated,
    /// Same count; existing storage was overwritten in place.
    Rewritten,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub allocations: u64,
    pub rewrites: u64,
    pub disposed: u64,
}

/// Renderer-side storage for one instanced overlay draw.
///
/// Instance lists arrive whole from each overlay pass; the batch only swaps
/// its storage when the instance count changes, so recoloring or moving the
/// same set of cells reuses the existing buffers.
#[derive(Debug, Default)]
pub struct InstanceBatch {
    transforms: Vec<InstanceTransform>,
    colors: Vec<InstanceColor>,
    transforms_dirty: bool,
    colors_dirty: bool,
    stats: BatchStats,
}

impl InstanceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.transforms.len()
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    pub fn apply(&mut self, draw: &SceneInstances) -> BatchUpdate {
        let count = draw.transforms.len().min(draw.colors.len());
        if count != draw.transforms.len() || count != draw.colors.len() {
            tracing::warn!(
                "instance batch: {} transforms vs {} colors, truncating to {}",
                draw.transforms.len(),
                draw.colors.len(),
                count
            );
        }

        let update = if count == self.transforms.len() {
            self.stats.rewrites += 1;
            BatchUpdate::Rewritten
        } else {
            if !self.transforms.is_empty() {
                self.stats.disposed += 1;
            }
            self.transforms = vec![InstanceTransform::zeroed(); count];
            self.colors = vec![InstanceColor::zeroed(); count];
            self.stats.allocations += 1;
            BatchUpdate::Reallocated
        };

        for (slot, transform) in self.transforms.iter_mut().zip(&draw.transforms) {
            slot.columns = transform.to_cols_array_2d();
        }
        for (slot, color) in self.colors.iter_mut().zip(&draw.colors) {
            slot.rgb = *color;
        }
        self.transforms_dirty = true;
        self.colors_dirty = true;
        update
    }

    pub fn is_dirty(&self) -> bool {
        self.transforms_dirty || self.colors_dirty
    }

    /// Returns `(transforms, colors)` bytes for buffers that need uploading
    /// and clears the dirty flags.
    pub fn take_dirty(&mut self) -> (Option<&[u8]>, Option<&[u8]>) {
        let transforms = std::mem::take(&mut self.transforms_dirty)
            .then(|| bytemuck::cast_slice::<InstanceTransform, u8>(&self.transforms));
        let colors = std::mem::take(&mut self.colors_dirty)
            .then(|| bytemuck::cast_slice::<InstanceColor, u8>(&self.colors));
        (transforms, colors)
    }

    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    pub fn colors(&self) -> &[InstanceColor] {
        &self.colors
    }

    /// Releases storage on teardown.
    pub fn dispose(&mut self) {
        if !self.transforms.is_empty() {
            self.stats.disposed += 1;
        }
        self.transforms = Vec::new();
        self.colors = Vec::new();
        self.transforms_dirty = false;
        self.colors_dirty = false;
    }
}
