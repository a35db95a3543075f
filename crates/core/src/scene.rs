use heatlayer_scene::{SceneInstances, SceneMarker, SceneMarkerKind, SceneMarkers};

use crate::declutter::Accepted;
use crate::markers::{MarkerFamily, MarkerSet};
use crate::overlay::OverlayInstance;

pub fn scene_instances(instances: &[OverlayInstance]) -> SceneInstances {
    SceneInstances {
        transforms: instances.iter().map(OverlayInstance::transform).collect(),
        colors: instances.iter().map(|instance| instance.color).collect(),
    }
}

pub fn scene_marker_kind(family: MarkerFamily) -> SceneMarkerKind {
    match family {
        MarkerFamily::Event => SceneMarkerKind::Event,
        MarkerFamily::FieldObject => SceneMarkerKind::FieldObject,
        MarkerFamily::PathWaypoint => SceneMarkerKind::PathWaypoint,
    }
}

/// Render primitives for the markers that survived decluttering.
pub fn scene_markers(set: &MarkerSet, accepted: &[Accepted]) -> SceneMarkers {
    let markers = accepted
        .iter()
        .filter_map(|kept| {
            let candidate = set.candidates.get(kept.index)?;
            Some(SceneMarker {
                id: candidate.id,
                position: candidate.world_position.to_array(),
                screen: [kept.screen.px, kept.screen.py],
            })
        })
        .collect();
    SceneMarkers {
        kind: scene_marker_kind(set.family),
        markers,
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::declutter::ScreenPoint;
    use crate::grid::CellKey;
    use crate::markers::MarkerRecord;

    #[test]
    fn instances_become_transform_and_color_columns() {
        let instances = vec![
            OverlayInstance {
                cell: CellKey::new(0, 0),
                position: Vec3::new(1.0, 0.0, 1.0),
                orientation: Quat::IDENTITY,
                scale: Vec3::ONE,
                color: [1.0, 0.0, 0.0],
            },
            OverlayInstance {
                cell: CellKey::new(1, 0),
                position: Vec3::new(2.0, 0.0, 1.0),
                orientation: Quat::IDENTITY,
                scale: Vec3::ONE,
                color: [0.0, 1.0, 0.0],
            },
        ];
        let scene = scene_instances(&instances);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.colors[1], [0.0, 1.0, 0.0]);
        assert_eq!(scene.transforms[0].w_axis.truncate(), Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn markers_keep_accepted_order() {
        let set = MarkerSet::new(
            MarkerFamily::PathWaypoint,
            (0..3)
                .map(|id| MarkerRecord {
                    id,
                    position: [id as f32, 0.0, 0.0],
                    label: None,
                    timestamp: None,
                })
                .collect(),
        );
        let accepted = vec![
            Accepted {
                index: 0,
                screen: ScreenPoint { px: 1.0, py: 2.0 },
            },
            Accepted {
                index: 2,
                screen: ScreenPoint { px: 30.0, py: 2.0 },
            },
        ];
        let scene = scene_markers(&set, &accepted);
        assert_eq!(scene.kind, SceneMarkerKind::PathWaypoint);
        assert_eq!(scene.markers.iter().map(|m| m.id).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(scene.markers[1].screen, [30.0, 2.0]);
    }
}
