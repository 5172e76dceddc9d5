//! Headless editor demo
//!
//! Builds a small scene, then drives the editor session for a few frames
//! with scripted input: a click on the viewport centre, a focus on the
//! picked object and a delete. Pass a `.toml` or `.ron` path to override
//! the default editor configuration.

use scene_engine::config::{Config, ConfigError, EditorConfig};
use scene_engine::editor::EditorSession;
use scene_engine::foundation::math::Vec3;
use scene_engine::input::{InputSnapshot, KeyCode, MouseButton, Viewport};
use scene_engine::scene::{DrawList, PrimitiveShape, SceneError};

const FRAME_TIME: f32 = 1.0 / 60.0;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

fn load_config() -> Result<EditorConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading editor configuration from {}", path);
            Ok(EditorConfig::load_from_file(&path)?)
        }
        None => Ok(EditorConfig::default()),
    }
}

fn build_scene(session: &mut EditorSession) -> Result<(), DemoError> {
    let graph = session.graph_mut();

    graph.create_primitive(PrimitiveShape::Cube, None)?;

    let sphere = graph.create_primitive(PrimitiveShape::Sphere, None)?;
    if let Some(node) = graph.node_mut(sphere) {
        node.transform_mut().set_position(Vec3::new(3.0, 0.0, 0.0));
    }

    let floor = graph.create_primitive(PrimitiveShape::Plane, None)?;
    if let Some(node) = graph.node_mut(floor) {
        node.transform_mut().set_position(Vec3::new(0.0, -1.0, 0.0));
        node.transform_mut().set_scale(Vec3::new(20.0, 1.0, 20.0));
    }

    graph.create_camera(None)?;
    log::info!("Scene built with {} nodes", graph.len());
    Ok(())
}

fn report(frame: u64, draw_list: &DrawList) {
    log::info!(
        "Frame {}: {} mesh(es) drawn, {} culled, {} debug line(s)",
        frame,
        draw_list.commands().len(),
        draw_list.culled_count(),
        draw_list.lines().len()
    );
}

fn main() -> Result<(), DemoError> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting editor demo");

    let config = load_config()?;
    let viewport = Viewport::new(1280.0, 720.0).with_title_bar(config.picking.title_bar_height);
    let mut session = EditorSession::new(&config);
    build_scene(&mut session)?;

    let mut input = InputSnapshot::new();
    input.warp_mouse(640.0, 360.0 + config.picking.title_bar_height * 0.5);

    // Idle frame
    let draw_list = session.frame(FRAME_TIME, &input, &viewport);
    report(session.clock().frame_count(), &draw_list);

    // Click the viewport centre
    input.set_button(MouseButton::Left, true);
    let draw_list = session.frame(FRAME_TIME, &input, &viewport);
    report(session.clock().frame_count(), &draw_list);
    input.set_button(MouseButton::Left, false);
    input.end_frame();

    let selected = session.graph().selected();
    match selected.and_then(|id| session.graph().node(id)) {
        Some(node) => log::info!("Selected '{}' {}", node.name(), node.id()),
        None => log::info!("Nothing under the cursor"),
    }

    // Frame the selection
    input.set_key(KeyCode::F, true);
    let draw_list = session.frame(FRAME_TIME, &input, &viewport);
    report(session.clock().frame_count(), &draw_list);
    input.set_key(KeyCode::F, false);
    input.end_frame();
    log::info!("Editor camera now at {:?}", session.camera().camera().position());

    // Delete it
    input.set_key(KeyCode::Delete, true);
    let draw_list = session.frame(FRAME_TIME, &input, &viewport);
    report(session.clock().frame_count(), &draw_list);
    input.end_frame();

    log::info!(
        "Finished with {} nodes, selection {:?}",
        session.graph().len(),
        session.graph().selected()
    );
    Ok(())
}
