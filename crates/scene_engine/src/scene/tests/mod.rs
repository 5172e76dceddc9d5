//! Scene tests spanning several modules

mod hierarchy;
mod records;

use crate::config::CameraSettings;
use crate::foundation::math::{quat_from_euler_xyz, Vec3};
use crate::scene::camera::Camera;
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;

/// The editor's start-up view: (0, 10, -40) looking at the origin, 16:9
fn editor_camera() -> Camera {
    Camera::from_settings(&CameraSettings::default())
}

/// Give a node an arbitrary local pose
fn place(graph: &mut SceneGraph, id: NodeId, position: Vec3, euler: Vec3, scale: Vec3) {
    let transform = graph
        .node_mut(id)
        .expect("node exists")
        .transform_mut();
    transform.set_position(position);
    transform.set_rotation(quat_from_euler_xyz(euler));
    transform.set_scale(scale);
}
