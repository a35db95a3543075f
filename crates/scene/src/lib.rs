use glam::Mat4;

/// Instanced draw payload for one overlay layer.
#[derive(Debug, Clone, Default)]
pub struct SceneInstances {
    pub transforms: Vec<Mat4>,
    pub colors: Vec<[f32; 3]>,
}

impl SceneInstances {
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneMarkerKind {
    Event,
    FieldObject,
    PathWaypoint,
}

#[derive(Debug, Clone)]
pub struct SceneMarker {
    pub id: u64,
    pub position: [f32; 3],
    pub screen: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct SceneMarkers {
    pub kind: SceneMarkerKind,
    pub markers: Vec<SceneMarker>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    pub heatmap: SceneInstances,
    pub markers: Vec<SceneMarkers>,
}

impl SceneSnapshot {
    pub fn marker_count(&self) -> usize {
        self.markers.iter().map(|set| set.markers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_count_sums_all_families() {
        let snapshot = SceneSnapshot {
            heatmap: SceneInstances::default(),
            markers: vec![
                SceneMarkers {
                    kind: SceneMarkerKind::Event,
                    markers: vec![SceneMarker {
                        id: 1,
                        position: [0.0; 3],
                        screen: [0.0; 2],
                    }],
                },
                SceneMarkers {
                    kind: SceneMarkerKind::PathWaypoint,
                    markers: vec![
                        SceneMarker {
                            id: 2,
                            position: [0.0; 3],
                            screen: [0.0; 2],
                        },
                        SceneMarker {
                            id: 3,
                            position: [1.0; 3],
                            screen: [4.0; 2],
                        },
                    ],
                },
            ],
        };
        assert_eq!(snapshot.marker_count(), 3);
        assert!(snapshot.heatmap.is_empty());
    }
}
