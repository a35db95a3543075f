use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub target: [f32; 3],
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, 0.0],
            distance: 30.0,
            yaw: 0.8,
            pitch: 0.9,
        }
    }
}

pub fn camera_position(camera: CameraState) -> Vec3 {
    let direction = camera_direction(camera);
    let target = Vec3::from(camera.target);
    target + direction * camera.distance.max(0.1)
}

/// Perspective view-projection for a viewport measured in physical pixels.
pub fn camera_view_proj(camera: CameraState, viewport: [f32; 2]) -> Mat4 {
    let viewport_width = viewport[0].max(1.0);
    let viewport_height = viewport[1].max(1.0);
    let aspect = viewport_width / viewport_height;

    let target = Vec3::from(camera.target);
    let position = camera_position(camera);

    let view = Mat4::look_at_rh(position, target, Vec3::Y);
    let projection = Mat4::perspective_rh(45_f32.to_radians(), aspect, 0.01, 1000.0);
    projection * view
}

fn camera_direction(camera: CameraState) -> Vec3 {
    let pitch = camera.pitch.clamp(-1.54, 1.54);
    let yaw = camera.yaw;

    let cos_pitch = pitch.cos();
    let sin_pitch = pitch.sin();
    let cos_yaw = yaw.cos();
    let sin_yaw = yaw.sin();

    Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    #[test]
    fn target_projects_to_viewport_center() {
        let camera = CameraState {
            target: [3.0, 1.0, -2.0],
            distance: 12.0,
            yaw: 0.3,
            pitch: 0.7,
        };
        let view_proj = camera_view_proj(camera, [800.0, 600.0]);
        let clip = view_proj * Vec4::new(3.0, 1.0, -2.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1.0e-4);
        assert!((clip.y / clip.w).abs() < 1.0e-4);
    }

    #[test]
    fn position_sits_at_distance_from_target() {
        let camera = CameraState::default();
        let position = camera_position(camera);
        assert!((position.distance(Vec3::from(camera.target)) - camera.distance).abs() < 1.0e-4);
        assert!(position.y > 0.0);
    }
}
