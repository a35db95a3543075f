use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::{read_bytes, LoadError};
use crate::declutter::{declutter_screen, Accepted, DeclutterCandidate, ViewState};
use crate::settings::MarkerSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerFamily {
    Event,
    FieldObject,
    PathWaypoint,
}

impl MarkerFamily {
    pub const ALL: [MarkerFamily; 3] = [
        MarkerFamily::Event,
        MarkerFamily::FieldObject,
        MarkerFamily::PathWaypoint,
    ];

    pub fn threshold_px(self, settings: &MarkerSettings) -> f32 {
        match self {
            MarkerFamily::Event => settings.event_px,
            MarkerFamily::FieldObject => settings.field_object_px,
            MarkerFamily::PathWaypoint => settings.waypoint_px,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: u64,
    pub position: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// One family of markers in priority order.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    pub family: MarkerFamily,
    pub candidates: Vec<DeclutterCandidate<MarkerRecord>>,
}

impl MarkerSet {
    pub fn new(family: MarkerFamily, records: Vec<MarkerRecord>) -> Self {
        let candidates = records
            .into_iter()
            .map(|record| DeclutterCandidate {
                world_position: Vec3::from(record.position),
                id: record.id,
                metadata: record,
            })
            .collect();
        Self { family, candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Most recent first; untimed records keep their relative order at the end.
    pub fn sort_by_recency(&mut self) {
        self.candidates.sort_by(|a, b| {
            match (a.metadata.timestamp, b.metadata.timestamp) {
                (Some(ta), Some(tb)) => tb.total_cmp(&ta),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    /// Scales world positions into render space.
    pub fn scaled(mut self, scale: f32) -> Self {
        for candidate in &mut self.candidates {
            candidate.world_position *= scale;
        }
        self
    }

    pub fn declutter(&self, view: &ViewState, settings: &MarkerSettings) -> Vec<Accepted> {
        declutter_screen(
            &self.candidates,
            |candidate| candidate.world_position,
            view,
            self.family.threshold_px(settings),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MarkerDocument {
    events: Vec<MarkerRecord>,
    field_objects: Vec<MarkerRecord>,
    waypoints: Vec<MarkerRecord>,
}

pub fn parse_markers_json(data: &[u8]) -> Result<Vec<MarkerSet>, LoadError> {
    let doc: MarkerDocument = serde_json::from_slice(data).map_err(|err| LoadError::Parse {
        what: "markers",
        message: err.to_string(),
    })?;
    let mut events = MarkerSet::new(MarkerFamily::Event, doc.events);
    events.sort_by_recency();
    Ok(vec![
        events,
        MarkerSet::new(MarkerFamily::FieldObject, doc.field_objects),
        MarkerSet::new(MarkerFamily::PathWaypoint, doc.waypoints),
    ])
}

pub fn load_markers(path: &Path) -> Result<Vec<MarkerSet>, LoadError> {
    let data = read_bytes(path)?;
    parse_markers_json(&data)
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;

    fn record(id: u64, x: f32, timestamp: Option<f64>) -> MarkerRecord {
        MarkerRecord {
            id,
            position: [x, 0.0, 0.0],
            label: None,
            timestamp,
        }
    }

    fn pixel_view() -> ViewState {
        let proj = Mat4::orthographic_rh(-100.0, 100.0, -50.0, 50.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        ViewState::new(proj * view, 200.0, 100.0)
    }

    #[test]
    fn recency_sort_puts_newest_first() {
        let mut set = MarkerSet::new(
            MarkerFamily::Event,
            vec![
                record(1, 0.0, Some(10.0)),
                record(2, 0.0, None),
                record(3, 0.0, Some(30.0)),
                record(4, 0.0, Some(20.0)),
            ],
        );
        set.sort_by_recency();
        let ids: Vec<u64> = set.candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }

    #[test]
    fn each_family_uses_its_own_threshold() {
        let settings = MarkerSettings {
            event_px: 30.0,
            field_object_px: 30.0,
            waypoint_px: 5.0,
        };
        let records = vec![record(1, 0.0, None), record(2, 10.0, None)];
        let events = MarkerSet::new(MarkerFamily::Event, records.clone());
        let waypoints = MarkerSet::new(MarkerFamily::PathWaypoint, records);
        let view = pixel_view();
        assert_eq!(events.declutter(&view, &settings).len(), 1);
        assert_eq!(waypoints.declutter(&view, &settings).len(), 2);
    }

    #[test]
    fn parses_marker_document() {
        let json = br#"{
            "events": [
                {"id": 1, "position": [0, 0, 0], "timestamp": 5},
                {"id": 2, "position": [1, 0, 0], "timestamp": 9}
            ],
            "waypoints": [{"id": 10, "position": [2, 0, 1], "label": "start"}]
        }"#;
        let sets = parse_markers_json(json).expect("markers");
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].family, MarkerFamily::Event);
        assert_eq!(sets[0].candidates[0].id, 2);
        assert!(sets[1].is_empty());
        assert_eq!(sets[2].candidates[0].metadata.label.as_deref(), Some("start"));
    }

    #[test]
    fn scaled_moves_world_positions() {
        let set = MarkerSet::new(MarkerFamily::FieldObject, vec![record(1, 4.0, None)]).scaled(0.5);
        assert_eq!(set.candidates[0].world_position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(set.candidates[0].metadata.position, [4.0, 0.0, 0.0]);
    }
}
