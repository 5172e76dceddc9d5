//! Editor session
//!
//! Owns the scene, the viewport camera and picking, and runs one frame in
//! a fixed order:
//!
//! 1. propagate transforms, so picking sees current bounds
//! 2. queue deletion of the selection on the delete key
//! 3. pick on left click
//! 4. move the viewport camera
//! 5. update the scene, culling against the game camera when there is one
//! 6. apply structural edits queued during the frame

use crate::config::EditorConfig;
use crate::foundation::time::FrameClock;
use crate::input::{InputSource, KeyCode, MouseButton, Viewport};
use crate::scene::commands::SceneCommand;
use crate::scene::graph::SceneGraph;
use crate::scene::render_queue::DrawList;
use crate::systems::{PickResult, PickingSystem};

use super::camera_controller::EditorCamera;

/// Scene plus the editor state that drives it
#[derive(Debug)]
pub struct EditorSession {
    graph: SceneGraph,
    camera: EditorCamera,
    picking: PickingSystem,
    clock: FrameClock,
    last_pick: Option<PickResult>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditorSession {
    /// Empty scene with the configured camera and picking
    pub fn new(config: &EditorConfig) -> Self {
        log::info!("Starting editor session");
        Self {
            graph: SceneGraph::with_settings(config.scene.clone()),
            camera: EditorCamera::new(config.camera.clone()),
            picking: PickingSystem::new(&config.picking),
            clock: FrameClock::new(),
            last_pick: None,
        }
    }

    /// The scene
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable scene access between frames
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Viewport camera
    pub fn camera(&self) -> &EditorCamera {
        &self.camera
    }

    /// Mutable viewport camera
    pub fn camera_mut(&mut self) -> &mut EditorCamera {
        &mut self.camera
    }

    /// Picking system
    pub fn picking(&self) -> &PickingSystem {
        &self.picking
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Result of the most recent click
    pub fn last_pick(&self) -> Option<&PickResult> {
        self.last_pick.as_ref()
    }

    /// Run a frame with a wall-clock delta
    pub fn tick(&mut self, input: &impl InputSource, viewport: &Viewport) -> DrawList {
        let dt = self.clock.tick();
        self.run(dt, input, viewport)
    }

    /// Run a frame with an explicit delta
    pub fn frame(&mut self, dt: f32, input: &impl InputSource, viewport: &Viewport) -> DrawList {
        let dt = self.clock.advance(dt);
        self.run(dt, input, viewport)
    }

    fn run(&mut self, dt: f32, input: &impl InputSource, viewport: &Viewport) -> DrawList {
        self.sync_aspect_ratio(viewport);
        self.graph.propagate_transforms();

        if input.is_key_pressed(KeyCode::Delete) {
            if let Some(selected) = self.graph.selected() {
                self.graph.queue(SceneCommand::DeleteSubtree(selected));
            }
        }

        if input.is_button_pressed(MouseButton::Left) {
            let result = self.picking.pick_at(
                &self.graph,
                self.camera.camera(),
                viewport,
                input.mouse_position(),
            );
            if let Some(selection) = result.selection() {
                if let Err(err) = self.graph.set_selected(selection) {
                    log::warn!("Could not apply pick: {}", err);
                }
            }
            self.last_pick = Some(result);
        }

        self.camera.update(dt, input, &self.graph);

        let culling = self
            .graph
            .main_camera()
            .map_or_else(|| self.camera.camera().frustum().clone(), |camera| camera.frustum().clone());
        let draw_list = self.graph.update(dt, Some(&culling));

        let applied = self.graph.apply_pending_commands();
        if applied > 0 {
            log::debug!("Applied {} scene command(s)", applied);
        }
        draw_list
    }

    fn sync_aspect_ratio(&mut self, viewport: &Viewport) {
        let aspect = viewport.aspect_ratio();
        let camera = self.camera.camera_mut();
        if (camera.aspect_ratio() - aspect).abs() > f32::EPSILON {
            camera.set_aspect_ratio(aspect);
            camera.calculate_view_matrix();
        }
    }
}
