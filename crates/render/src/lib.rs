mod camera;
mod instance_batch;
mod resource_cache;

pub use camera::{camera_position, camera_view_proj, CameraState};
pub use instance_batch::{BatchStats, BatchUpdate, InstanceBatch, InstanceColor, InstanceTransform};
pub use resource_cache::{ResourceCache, ResourceCacheStats};
