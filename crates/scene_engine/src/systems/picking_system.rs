//! Mouse picking
//!
//! Turns a click into a world-space segment through the camera and finds
//! the closest triangle it crosses. A pick runs through fixed stages:
//!
//! ```text
//! Idle → RayCast → BroadPhase → NarrowPhase → Resolved → Idle
//! ```
//!
//! The broad phase keeps nodes whose world AABB the segment enters, ordered
//! by entry distance. The narrow phase moves a copy of the segment into each
//! candidate's model space and tests every triangle. Hit parameters are
//! fractions of the segment in both spaces, so they compare directly across
//! nodes with different scales.

use crate::config::PickingSettings;
use crate::foundation::math::Vec3;
use crate::input::Viewport;
use crate::physics::LineSegment;
use crate::scene::camera::Camera;
use crate::scene::graph::SceneGraph;
use crate::scene::mesh::MeshComponent;
use crate::scene::node::{NodeId, ObjectId};

/// Stage of the picking pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickState {
    /// Waiting for a click
    Idle,
    /// Building the world segment from the mouse position
    RayCast,
    /// Testing the segment against world AABBs
    BroadPhase,
    /// Testing triangles of the surviving candidates
    NarrowPhase,
    /// Closest hit chosen
    Resolved,
}

/// Closest triangle hit of a pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Node that was hit
    pub node: NodeId,
    /// Stable id of that node
    pub object_id: ObjectId,
    /// Fraction along the near-to-far segment
    pub t: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Outcome of a click
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickResult {
    /// The click missed the viewport; selection should not change
    OutsideViewport,
    /// Nothing under the cursor; selection should be cleared
    Miss,
    /// Something under the cursor
    Hit(PickHit),
}

impl PickResult {
    /// Selection implied by this result, `None` when it should stay as is
    pub fn selection(&self) -> Option<Option<NodeId>> {
        match self {
            Self::OutsideViewport => None,
            Self::Miss => Some(None),
            Self::Hit(hit) => Some(Some(hit.node)),
        }
    }
}

/// Ray picking against scene meshes
#[derive(Debug, Clone)]
pub struct PickingSystem {
    state: PickState,
    reserved_camera_name: String,
    last_segment: Option<LineSegment>,
    last_candidates: usize,
}

impl Default for PickingSystem {
    fn default() -> Self {
        Self::new(&PickingSettings::default())
    }
}

impl PickingSystem {
    /// Create a picking system
    pub fn new(settings: &PickingSettings) -> Self {
        Self {
            state: PickState::Idle,
            reserved_camera_name: settings.reserved_camera_name.clone(),
            last_segment: None,
            last_candidates: 0,
        }
    }

    /// Current stage; `Idle` between picks
    pub fn state(&self) -> PickState {
        self.state
    }

    /// World segment of the last pick
    pub fn last_segment(&self) -> Option<&LineSegment> {
        self.last_segment.as_ref()
    }

    /// Broad-phase survivors of the last pick
    pub fn last_candidate_count(&self) -> usize {
        self.last_candidates
    }

    fn enter(&mut self, state: PickState) {
        log::trace!("Picking {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Pick at a mouse position in window pixels
    pub fn pick_at(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        viewport: &Viewport,
        mouse: (f32, f32),
    ) -> PickResult {
        self.enter(PickState::RayCast);
        let Some((ndc_x, ndc_y)) = viewport.to_ndc(mouse.0, mouse.1) else {
            log::trace!("Click at {:?} is outside the viewport", mouse);
            self.enter(PickState::Idle);
            return PickResult::OutsideViewport;
        };

        match self.pick_ndc(graph, camera, ndc_x, ndc_y) {
            Some(hit) => PickResult::Hit(hit),
            None => PickResult::Miss,
        }
    }

    /// Pick at a normalized device position
    pub fn pick_ndc(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        ndc_x: f32,
        ndc_y: f32,
    ) -> Option<PickHit> {
        self.enter(PickState::RayCast);
        let Some(segment) = camera.unproject_line_segment(ndc_x, ndc_y) else {
            log::warn!("Camera projection is not invertible, pick skipped");
            self.enter(PickState::Idle);
            return None;
        };
        self.last_segment = Some(segment);

        self.enter(PickState::BroadPhase);
        let candidates = self.broad_phase(graph, camera, &segment);
        self.last_candidates = candidates.len();

        self.enter(PickState::NarrowPhase);
        let hit = Self::narrow_phase(graph, &segment, &candidates);

        self.enter(PickState::Resolved);
        match &hit {
            Some(hit) => log::debug!("Picked {} at t = {:.4}", hit.object_id, hit.t),
            None => log::debug!("Pick hit nothing ({} candidate(s))", candidates.len()),
        }
        self.enter(PickState::Idle);
        hit
    }

    /// Nodes whose world AABB the segment enters, nearest entry first
    pub fn broad_phase(
        &self,
        graph: &SceneGraph,
        camera: &Camera,
        segment: &LineSegment,
    ) -> Vec<(NodeId, f32)> {
        let frustum = camera.frustum();
        let mut candidates: Vec<(NodeId, ObjectId, f32)> = graph
            .bfs_order()
            .into_iter()
            .filter_map(|id| {
                let node = graph.node(id)?;
                if !node.is_active() || node.name() == self.reserved_camera_name {
                    return None;
                }
                let aabb = node.global_aabb()?;
                if !frustum.is_visible(aabb) {
                    return None;
                }
                let (entry, _) = aabb.intersect_segment(segment)?;
                Some((id, node.id(), entry))
            })
            .collect();

        candidates.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)));
        candidates.into_iter().map(|(id, _, entry)| (id, entry)).collect()
    }

    /// Closest triangle hit among broad-phase candidates
    ///
    /// Equal distances go to the node with the smallest id.
    pub fn narrow_phase(
        graph: &SceneGraph,
        segment: &LineSegment,
        candidates: &[(NodeId, f32)],
    ) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;

        for &(id, entry) in candidates {
            if best.is_some_and(|hit| entry > hit.t) {
                break;
            }
            let Some(node) = graph.node(id) else {
                continue;
            };
            let Some(mesh) = node.get_component::<MeshComponent>() else {
                continue;
            };
            if mesh.vertex_count() < 3 {
                continue;
            }
            let Some(inverse) = node.world_matrix().try_inverse() else {
                log::warn!("World matrix of '{}' is not invertible, skipped", node.name());
                continue;
            };

            let local = segment.transformed(&inverse);
            let closest = mesh
                .triangles()
                .filter_map(|triangle| triangle.intersect_segment(&local))
                .min_by(f32::total_cmp);

            if let Some(t) = closest {
                let candidate = PickHit {
                    node: id,
                    object_id: node.id(),
                    t,
                    point: segment.point_at(t),
                };
                let better = match best {
                    None => true,
                    Some(current) => t
                        .total_cmp(&current.t)
                        .then(candidate.object_id.cmp(&current.object_id))
                        .is_lt(),
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        best
    }
}
