use std::collections::HashSet;

use approx::assert_relative_eq;

use super::place;
use crate::config::SceneSettings;
use crate::foundation::math::Vec3;
use crate::scene::camera::CameraComponent;
use crate::scene::component::ComponentKind;
use crate::scene::graph::SceneGraph;
use crate::scene::material::MaterialComponent;
use crate::scene::mesh::{MeshComponent, MeshSource};
use crate::scene::node::ObjectId;
use crate::scene::persistence::{ComponentRecord, FieldValue, NodeRecord, Persist};
use crate::scene::primitives::PrimitiveShape;

fn sample_scene() -> SceneGraph {
    let mut graph = SceneGraph::new();
    let holder = graph.create_game_object(None, None).unwrap();
    let cube = graph.create_primitive(PrimitiveShape::Cube, Some(holder)).unwrap();
    graph
        .node_mut(cube)
        .unwrap()
        .add_component(MaterialComponent::with_texture("checker.png", 3, 64, 64));
    graph.create_camera(None).unwrap();

    place(&mut graph, holder, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.8, 0.0), Vec3::repeat(2.0));
    place(&mut graph, cube, Vec3::new(0.0, 0.0, -1.5), Vec3::new(0.3, 0.0, 0.1), Vec3::new(1.0, 0.5, 1.0));
    graph.propagate_transforms();
    graph
}

#[test]
fn test_snapshot_lists_parents_first() {
    let graph = sample_scene();
    let records = graph.snapshot();

    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["Root", "GameObject", "Cube", "Camera"]);
    assert_eq!(records[0].parent_id, None);
    assert_eq!(records[2].parent_id, Some(records[1].id));

    let kinds: Vec<ComponentKind> = records[2].components.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ComponentKind::Transform, ComponentKind::Mesh, ComponentKind::Material]);
}

#[test]
fn test_rebuild_through_ron_keeps_hierarchy_and_pose() {
    let graph = sample_scene();
    let text = ron::to_string(&graph.snapshot()).unwrap();
    let records: Vec<NodeRecord> = ron::from_str(&text).unwrap();

    let mut loaded = SceneGraph::from_records(&records, SceneSettings::default());
    assert_eq!(loaded.len(), graph.len());

    let cube = loaded.find_by_name("Cube").unwrap();
    let original = graph.find_by_name("Cube").unwrap();
    assert_eq!(loaded.node(loaded.parent(cube).unwrap()).unwrap().name(), "GameObject");
    assert_relative_eq!(
        *loaded.node(cube).unwrap().world_matrix(),
        *graph.node(original).unwrap().world_matrix(),
        epsilon = 1e-4
    );

    let node = loaded.node(cube).unwrap();
    assert_eq!(
        node.get_component::<MeshComponent>().unwrap().source(),
        &MeshSource::Primitive(PrimitiveShape::Cube)
    );
    assert_eq!(node.get_component::<MaterialComponent>().unwrap().texture_id, 3);
    assert!(node.global_aabb().is_some());

    let camera = loaded.find_by_name("Camera").unwrap();
    assert!(loaded.node(camera).unwrap().get_component::<CameraComponent>().is_some());

    // Fresh ids never collide with loaded ones
    let max_id = records.iter().map(|record| record.id).max().unwrap();
    let fresh = loaded.create_game_object(None, None).unwrap();
    assert!(loaded.node(fresh).unwrap().id().0 > max_id);
}

#[test]
fn test_orphans_and_bad_fields_still_load() {
    let mut transform = ComponentRecord::new(ComponentKind::Transform);
    transform.push("position", FieldValue::Text("not a vector".to_string()));
    transform.push("scale", FieldValue::Vec3([2.0, 2.0, 2.0]));

    let records = vec![
        NodeRecord { name: "Root".to_string(), id: 10, parent_id: None, components: Vec::new() },
        NodeRecord {
            name: "Lost".to_string(),
            id: 11,
            parent_id: Some(99),
            components: vec![transform],
        },
        NodeRecord { name: "Twin".to_string(), id: 11, parent_id: Some(10), components: Vec::new() },
    ];

    let graph = SceneGraph::from_records(&records, SceneSettings::default());
    assert_eq!(graph.len(), 2);

    let lost = graph.find_by_name("Lost").unwrap();
    assert_eq!(graph.parent(lost), Some(graph.root()));
    let transform = graph.node(lost).unwrap().transform();
    assert_relative_eq!(transform.position(), Vec3::zeros());
    assert_relative_eq!(transform.scale(), Vec3::repeat(2.0));
    assert!(graph.find_by_name("Twin").is_none());
}

fn record(name: &str, id: u64, parent_id: Option<u64>) -> NodeRecord {
    NodeRecord { name: name.to_string(), id, parent_id, components: Vec::new() }
}

fn object_ids(graph: &SceneGraph) -> Vec<ObjectId> {
    graph.node_ids().iter().map(|id| graph.node(*id).unwrap().id()).collect()
}

#[test]
fn test_extreme_record_ids_still_link() {
    let records = vec![
        record("Root", 1, None),
        record("Edge", u64::MAX, Some(1)),
        record("Leaf", 4, Some(u64::MAX)),
    ];

    let mut graph = SceneGraph::from_records(&records, SceneSettings::default());
    assert_eq!(graph.len(), 3);

    let edge = graph.find_by_name("Edge").unwrap();
    let leaf = graph.find_by_name("Leaf").unwrap();
    assert_eq!(graph.parent(edge), Some(graph.root()));
    assert_eq!(graph.parent(leaf), Some(edge));

    let fresh = graph.create_game_object(None, None).unwrap();
    let ids = object_ids(&graph);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    assert!(ids.contains(&graph.node(fresh).unwrap().id()));
}

#[test]
fn test_loaded_ids_never_shadow_the_default_root() {
    let records = vec![record("Lost", 0, Some(7)), record("Sibling", 3, Some(0))];

    let graph = SceneGraph::from_records(&records, SceneSettings::default());
    let lost = graph.find_by_name("Lost").unwrap();
    let sibling = graph.find_by_name("Sibling").unwrap();
    assert_eq!(graph.parent(lost), Some(graph.root()));
    assert_eq!(graph.parent(sibling), Some(lost));

    let root_id = graph.node(graph.root()).unwrap().id();
    assert_ne!(graph.node(lost).unwrap().id(), root_id);
    let ids = object_ids(&graph);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
}

#[test]
fn test_root_record_after_children() {
    let records = vec![
        record("Child", 5, Some(1)),
        record("Grandchild", 6, Some(5)),
        record("Stage", 1, None),
    ];

    let graph = SceneGraph::from_records(&records, SceneSettings::default());
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.node(graph.root()).unwrap().name(), "Stage");

    let child = graph.find_by_name("Child").unwrap();
    let grandchild = graph.find_by_name("Grandchild").unwrap();
    assert_eq!(graph.parent(child), Some(graph.root()));
    assert_eq!(graph.parent(grandchild), Some(child));
}

#[test]
fn test_root_record_keeps_only_its_transform() {
    let mut transform = ComponentRecord::new(ComponentKind::Transform);
    transform.push("position", FieldValue::Vec3([0.0, 1.0, 0.0]));
    let mut root = record("Stage", 1, None);
    root.components = vec![transform, MeshComponent::primitive(PrimitiveShape::Cube).to_record()];

    let mut graph = SceneGraph::from_records(&[root], SceneSettings::default());
    let node = graph.node(graph.root()).unwrap();
    assert!(node.get_component::<MeshComponent>().is_none());
    assert!(node.global_aabb().is_none());
    assert_relative_eq!(node.transform().position(), Vec3::new(0.0, 1.0, 0.0));

    let draw_list = graph.update(0.016, None);
    assert!(draw_list.commands().is_empty());
}
