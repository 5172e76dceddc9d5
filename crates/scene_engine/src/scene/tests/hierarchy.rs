use approx::assert_relative_eq;

use super::place;
use crate::foundation::math::{transform_point, Mat4, Vec3};
use crate::scene::commands::SceneCommand;
use crate::scene::error::SceneError;
use crate::scene::graph::SceneGraph;
use crate::scene::mesh::MeshComponent;
use crate::scene::primitives::PrimitiveShape;

#[test]
fn test_world_is_parent_world_times_local() {
    let mut graph = SceneGraph::new();
    let a = graph.create_game_object(None, None).unwrap();
    let b = graph.create_game_object(None, Some(a)).unwrap();
    let c = graph.create_primitive(PrimitiveShape::Cube, Some(b)).unwrap();

    place(&mut graph, a, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 0.0, 0.2), Vec3::new(2.0, 1.0, 1.0));
    place(&mut graph, b, Vec3::new(-4.0, 0.5, 0.0), Vec3::new(0.0, 1.1, 0.0), Vec3::repeat(0.5));
    place(&mut graph, c, Vec3::new(0.0, 0.0, 7.0), Vec3::new(-0.4, 0.2, 0.9), Vec3::new(1.0, 3.0, 1.0));
    graph.propagate_transforms();

    let root = graph.root();
    let root_world = *graph.node(root).unwrap().world_matrix();
    assert_relative_eq!(root_world, *graph.node(root).unwrap().transform().local_matrix());

    for (parent, child) in [(a, b), (b, c)] {
        let parent_world = graph.node(parent).unwrap().world_matrix();
        let child_node = graph.node(child).unwrap();
        let expected = parent_world * child_node.transform().local_matrix();
        assert_relative_eq!(*child_node.world_matrix(), expected, epsilon = 1e-5);
    }
}

#[test]
fn test_parent_move_reaches_grandchildren() {
    let mut graph = SceneGraph::new();
    let a = graph.create_game_object(None, None).unwrap();
    let b = graph.create_game_object(None, Some(a)).unwrap();
    let c = graph.create_primitive(PrimitiveShape::Cube, Some(b)).unwrap();
    graph.propagate_transforms();

    graph.node_mut(a).unwrap().transform_mut().set_position(Vec3::new(0.0, 10.0, 0.0));
    // Nothing moves until the next pass
    assert_relative_eq!(graph.node(c).unwrap().transform().world_position(), Vec3::zeros());

    graph.propagate_transforms();
    let node = graph.node(c).unwrap();
    assert_relative_eq!(node.transform().world_position(), Vec3::new(0.0, 10.0, 0.0));
    assert_relative_eq!(node.global_aabb().unwrap().min.y, 9.5, epsilon = 1e-5);
}

#[test]
fn test_reparent_preserves_world_pose() {
    let mut graph = SceneGraph::new();
    let first = graph.create_game_object(None, None).unwrap();
    let second = graph.create_game_object(None, None).unwrap();
    let node = graph.create_primitive(PrimitiveShape::Sphere, Some(first)).unwrap();

    place(&mut graph, first, Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.7, 0.0), Vec3::repeat(2.0));
    place(&mut graph, second, Vec3::new(0.0, -3.0, 1.0), Vec3::new(0.5, 0.0, -0.25), Vec3::repeat(0.5));
    place(&mut graph, node, Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.1, 0.2, 0.3), Vec3::repeat(1.0));
    graph.propagate_transforms();
    let before = *graph.node(node).unwrap().world_matrix();

    graph.reparent(node, Some(second)).unwrap();
    graph.propagate_transforms();
    assert_eq!(graph.parent(node), Some(second));
    assert!(graph.children(first).is_empty());
    assert_relative_eq!(*graph.node(node).unwrap().world_matrix(), before, epsilon = 1e-4);

    graph.reparent(node, None).unwrap();
    graph.propagate_transforms();
    assert_eq!(graph.parent(node), Some(graph.root()));
    assert_relative_eq!(*graph.node(node).unwrap().world_matrix(), before, epsilon = 1e-4);
}

#[test]
fn test_global_aabb_encloses_every_vertex() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_game_object(None, None).unwrap();
    let sphere = graph.create_primitive(PrimitiveShape::Sphere, Some(parent)).unwrap();
    let cylinder = graph.create_primitive(PrimitiveShape::Cylinder, None).unwrap();

    place(&mut graph, parent, Vec3::new(3.0, -1.0, 2.0), Vec3::new(0.9, -0.3, 0.4), Vec3::new(1.0, 2.0, 0.5));
    place(&mut graph, sphere, Vec3::new(0.5, 0.0, -2.0), Vec3::new(0.2, 1.3, -0.7), Vec3::new(3.0, 0.25, 1.0));
    place(&mut graph, cylinder, Vec3::new(-6.0, 0.0, 0.0), Vec3::new(1.57, 0.0, 0.3), Vec3::new(0.1, 4.0, 0.1));
    graph.propagate_transforms();

    for id in [sphere, cylinder] {
        let node = graph.node(id).unwrap();
        let world: Mat4 = *node.world_matrix();
        let aabb = node.global_aabb().unwrap();
        let mesh = node.get_component::<MeshComponent>().unwrap();

        for vertex in mesh.vertices() {
            let point = transform_point(&world, vertex);
            for axis in 0..3 {
                assert!(point[axis] >= aabb.min[axis] - 1e-4);
                assert!(point[axis] <= aabb.max[axis] + 1e-4);
            }
        }
        for corner in node.global_obb().unwrap().corners() {
            for axis in 0..3 {
                assert!(corner[axis] >= aabb.min[axis] - 1e-4);
                assert!(corner[axis] <= aabb.max[axis] + 1e-4);
            }
        }
    }
}

#[test]
fn test_delete_subtree_releases_descendants() {
    let mut graph = SceneGraph::new();
    let keep = graph.create_game_object(None, None).unwrap();
    let top = graph.create_game_object(None, None).unwrap();
    let mid = graph.create_primitive(PrimitiveShape::Cube, Some(top)).unwrap();
    let leaf_a = graph.create_game_object(None, Some(mid)).unwrap();
    let leaf_b = graph.create_primitive(PrimitiveShape::Plane, Some(mid)).unwrap();
    graph.set_selected(Some(leaf_b)).unwrap();

    assert_eq!(graph.delete_subtree(top), Ok(4));

    for id in [top, mid, leaf_a, leaf_b] {
        assert!(!graph.contains(id));
        assert!(!graph.node_ids().contains(&id));
    }
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.node_ids(), &[graph.root(), keep]);
    assert_eq!(graph.children(graph.root()), &[keep]);
    assert_eq!(graph.selected(), None);

    assert_eq!(graph.delete_subtree(top), Err(SceneError::NodeNotFound(top)));
    assert_eq!(graph.delete_subtree(graph.root()), Err(SceneError::RootImmutable));
}

#[test]
fn test_replace_root_requires_empty_root() {
    let mut graph = SceneGraph::new();
    graph.create_game_object(None, None).unwrap();
    graph.create_primitive(PrimitiveShape::Cube, None).unwrap();
    let old_root = graph.root();

    assert_eq!(graph.replace_root().map(|_| ()), Err(SceneError::RootNotEmpty(2)));

    assert_eq!(graph.clear_all(), 2);
    let previous = graph.replace_root().unwrap();
    assert_eq!(previous.name(), "Root");
    assert!(!graph.contains(old_root));
    assert_ne!(graph.root(), old_root);
    assert_eq!(graph.node_ids(), &[graph.root()]);

    let fresh = graph.create_game_object(None, None).unwrap();
    assert_eq!(graph.parent(fresh), Some(graph.root()));
    assert!(graph.node(fresh).unwrap().id() > previous.id());
}

#[test]
fn test_commands_wait_for_apply() {
    let mut graph = SceneGraph::new();
    let a = graph.create_game_object(None, None).unwrap();
    let b = graph.create_game_object(None, None).unwrap();

    graph.queue(SceneCommand::Reparent { node: b, new_parent: Some(a) });
    graph.queue(SceneCommand::CreatePrimitive { shape: PrimitiveShape::Cube, parent: Some(b) });
    graph.queue(SceneCommand::Reparent { node: a, new_parent: Some(b) });
    graph.queue(SceneCommand::Select(Some(b)));

    let draw_list = graph.update(0.016, None);
    assert!(draw_list.commands().is_empty());
    assert_eq!(graph.parent(b), Some(graph.root()));
    assert_eq!(graph.pending_commands(), 4);

    // The cycle-forming reparent is skipped, the rest apply
    assert_eq!(graph.apply_pending_commands(), 3);
    assert_eq!(graph.pending_commands(), 0);
    assert_eq!(graph.parent(b), Some(a));
    assert_eq!(graph.parent(a), Some(graph.root()));
    assert_eq!(graph.children(b).len(), 1);
    assert_eq!(graph.selected(), Some(b));
}

#[test]
fn test_update_visits_below_root_breadth_first() {
    let mut graph = SceneGraph::new();
    let a = graph.create_primitive(PrimitiveShape::Cube, None).unwrap();
    let a_child = graph.create_primitive(PrimitiveShape::Plane, Some(a)).unwrap();
    let b = graph.create_primitive(PrimitiveShape::Sphere, None).unwrap();

    let draw_list = graph.update(0.016, None);
    let order: Vec<_> = draw_list.commands().iter().map(|command| command.node).collect();
    assert_eq!(order, vec![a, b, a_child]);
}
