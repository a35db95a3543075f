use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::{read_bytes, LoadError};

/// One weighted density sample produced by the analytics side.
///
/// With `z` present the plan-view coordinates are `(x, z)` and `y` is height.
/// Without `z` the sample is a 2D analytics point and `y` is the world Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedSample {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    pub density: f32,
}

impl WeightedSample {
    pub fn planar(x: f32, z: f32, density: f32) -> Self {
        Self {
            x,
            y: z,
            z: None,
            density,
        }
    }

    pub fn spatial(x: f32, y: f32, z: f32, density: f32) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            density,
        }
    }

    /// World `(x, z)` used for plan-view binning.
    pub fn plan_position(&self) -> [f32; 2] {
        match self.z {
            Some(z) => [self.x, z],
            None => [self.x, self.y],
        }
    }

    pub fn is_finite(&self) -> bool {
        let [x, z] = self.plan_position();
        x.is_finite() && z.is_finite() && self.density.is_finite()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SampleDocument {
    List(Vec<WeightedSample>),
    Wrapped { points: Vec<WeightedSample> },
}

pub fn parse_samples_json(data: &[u8]) -> Result<Vec<WeightedSample>, LoadError> {
    let doc: SampleDocument =
        serde_json::from_slice(data).map_err(|err| LoadError::Parse {
            what: "samples",
            message: err.to_string(),
        })?;
    Ok(match doc {
        SampleDocument::List(points) => points,
        SampleDocument::Wrapped { points } => points,
    })
}

pub fn load_samples(path: &Path) -> Result<Vec<WeightedSample>, LoadError> {
    let data = read_bytes(path)?;
    let samples = parse_samples_json(&data)?;
    tracing::debug!("loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}
