//! Editor-side control: viewport camera and the per-frame session

pub mod camera_controller;
pub mod session;

pub use camera_controller::EditorCamera;
pub use session::EditorSession;
