//! Persisted scene records
//!
//! Components write themselves as ordered `(name, value)` pairs and are
//! rebuilt from them; nodes add their name, id and parent id. The records
//! derive serde, so any serializer can carry them. Loading is lenient: a
//! missing or mistyped field falls back to its default with a warning and
//! the load carries on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SceneSettings;
use crate::foundation::math::{Quat, Quaternion, Transform, Vec3, DEGENERATE_EPSILON};
use crate::scene::camera::{CameraComponent, DEFAULT_FAR, DEFAULT_NEAR, DEFAULT_VERTICAL_FOV};
use crate::scene::component::{Component, ComponentKind};
use crate::scene::graph::SceneGraph;
use crate::scene::material::MaterialComponent;
use crate::scene::mesh::{MeshComponent, MeshDrawFlags, MeshSource};
use crate::scene::node::{NodeId, ObjectId, SceneNode};
use crate::scene::primitives::PrimitiveShape;
use crate::scene::transform::TransformComponent;

/// A single persisted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Scalar
    Float(f32),
    /// Vector as `[x, y, z]`
    Vec3([f32; 3]),
    /// Quaternion as `[x, y, z, w]`
    Quat([f32; 4]),
    /// Unsigned integer
    UInt(u64),
    /// String
    Text(String),
}

/// Ordered fields of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Which component the fields belong to
    pub kind: ComponentKind,
    /// Fields in write order
    pub fields: Vec<(String, FieldValue)>,
}

impl ComponentRecord {
    /// Empty record for a component kind
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn push(&mut self, name: &str, value: FieldValue) -> &mut Self {
        self.fields.push((name.to_string(), value));
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    fn missing(&self, name: &str) {
        log::warn!(
            "{} record has no usable '{}' field, using default",
            self.kind.name(),
            name
        );
    }

    /// Scalar field, or `default`
    pub fn float_or(&self, name: &str, default: f32) -> f32 {
        match self.field(name) {
            Some(FieldValue::Float(value)) if value.is_finite() => *value,
            _ => {
                self.missing(name);
                default
            }
        }
    }

    /// Vector field, or `default`
    pub fn vec3_or(&self, name: &str, default: Vec3) -> Vec3 {
        match self.field(name) {
            Some(FieldValue::Vec3(value)) if value.iter().all(|v| v.is_finite()) => {
                Vec3::from(*value)
            }
            _ => {
                self.missing(name);
                default
            }
        }
    }

    /// Rotation field, or identity
    pub fn quat_or_identity(&self, name: &str) -> Quat {
        match self.field(name) {
            Some(FieldValue::Quat([x, y, z, w])) => {
                let quaternion = Quaternion::new(*w, *x, *y, *z);
                if quaternion.norm() > DEGENERATE_EPSILON && quaternion.norm().is_finite() {
                    Quat::from_quaternion(quaternion)
                } else {
                    log::warn!("Degenerate '{}' quaternion, using identity", name);
                    Quat::identity()
                }
            }
            _ => {
                self.missing(name);
                Quat::identity()
            }
        }
    }

    /// Integer field, or `default`
    pub fn uint_or(&self, name: &str, default: u64) -> u64 {
        match self.field(name) {
            Some(FieldValue::UInt(value)) => *value,
            _ => {
                self.missing(name);
                default
            }
        }
    }

    /// String field, or `default`
    pub fn text_or(&self, name: &str, default: &str) -> String {
        match self.field(name) {
            Some(FieldValue::Text(value)) => value.clone(),
            _ => {
                self.missing(name);
                default.to_string()
            }
        }
    }
}

/// One persisted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Display name
    pub name: String,
    /// Stable id
    pub id: u64,
    /// Stable id of the parent, `None` for the root
    pub parent_id: Option<u64>,
    /// Component records, transform first
    pub components: Vec<ComponentRecord>,
}

/// Components that can be written to and rebuilt from a record
pub trait Persist: Sized {
    /// Kind written into the record
    const KIND: ComponentKind;

    /// Write fields in a fixed order
    fn write_fields(&self, record: &mut ComponentRecord);

    /// Rebuild, defaulting whatever is missing
    fn read_fields(record: &ComponentRecord) -> Self;

    /// Full record for this component
    fn to_record(&self) -> ComponentRecord {
        let mut record = ComponentRecord::new(Self::KIND);
        self.write_fields(&mut record);
        record
    }
}

impl Persist for TransformComponent {
    const KIND: ComponentKind = ComponentKind::Transform;

    fn write_fields(&self, record: &mut ComponentRecord) {
        let rotation = self.rotation();
        record
            .push("position", FieldValue::Vec3(self.position().into()))
            .push(
                "rotation",
                FieldValue::Quat([rotation.i, rotation.j, rotation.k, rotation.w]),
            )
            .push("scale", FieldValue::Vec3(self.scale().into()));
    }

    fn read_fields(record: &ComponentRecord) -> Self {
        Self::from_transform(&Transform::new(
            record.vec3_or("position", Vec3::zeros()),
            record.quat_or_identity("rotation"),
            record.vec3_or("scale", Vec3::repeat(1.0)),
        ))
    }
}

fn source_to_text(source: &MeshSource) -> String {
    match source {
        MeshSource::Primitive(shape) => format!("primitive:{}", shape.name()),
        MeshSource::Asset(path) => format!("asset:{path}"),
        MeshSource::Inline => "inline".to_string(),
    }
}

fn source_from_text(text: &str) -> MeshSource {
    if let Some(name) = text.strip_prefix("primitive:") {
        if let Some(shape) = PrimitiveShape::from_name(name) {
            return MeshSource::Primitive(shape);
        }
        log::warn!("Unknown primitive '{}', mesh left empty", name);
    } else if let Some(path) = text.strip_prefix("asset:") {
        return MeshSource::Asset(path.to_string());
    }
    MeshSource::Inline
}

impl Persist for MeshComponent {
    const KIND: ComponentKind = ComponentKind::Mesh;

    fn write_fields(&self, record: &mut ComponentRecord) {
        record
            .push("source", FieldValue::Text(source_to_text(self.source())))
            .push("flags", FieldValue::UInt(u64::from(self.flags.bits())))
            .push("normal_scale", FieldValue::Float(self.normal_scale));
    }

    /// Primitives are regenerated; asset and inline geometry is left for
    /// the importer to supply through [`MeshComponent::set_geometry`].
    fn read_fields(record: &ComponentRecord) -> Self {
        let source = source_from_text(&record.text_or("source", "inline"));
        let mut mesh = match &source {
            MeshSource::Primitive(shape) => Self::primitive(*shape),
            other => {
                let mut mesh = Self::default();
                mesh.set_source(other.clone());
                mesh
            }
        };

        let default_bits = u64::from(MeshDrawFlags::default().bits());
        let bits = u32::try_from(record.uint_or("flags", default_bits)).unwrap_or_default();
        mesh.flags = MeshDrawFlags::from_bits_truncate(bits);
        mesh.normal_scale = record.float_or("normal_scale", 1.0);
        mesh
    }
}

impl Persist for MaterialComponent {
    const KIND: ComponentKind = ComponentKind::Material;

    fn write_fields(&self, record: &mut ComponentRecord) {
        record
            .push("texture_name", FieldValue::Text(self.texture_name.clone()))
            .push("width", FieldValue::UInt(u64::from(self.width)))
            .push("height", FieldValue::UInt(u64::from(self.height)))
            .push("texture_id", FieldValue::UInt(u64::from(self.texture_id)));
    }

    fn read_fields(record: &ComponentRecord) -> Self {
        let to_u32 = |name: &str| u32::try_from(record.uint_or(name, 0)).unwrap_or_default();
        Self {
            texture_name: record.text_or("texture_name", ""),
            width: to_u32("width"),
            height: to_u32("height"),
            texture_id: to_u32("texture_id"),
        }
    }
}

impl Persist for CameraComponent {
    const KIND: ComponentKind = ComponentKind::Camera;

    fn write_fields(&self, record: &mut ComponentRecord) {
        let camera = self.camera();
        record
            .push("aspect_ratio", FieldValue::Float(camera.aspect_ratio()))
            .push("vertical_fov", FieldValue::Float(camera.vertical_fov()))
            .push("near", FieldValue::Float(camera.near()))
            .push("far", FieldValue::Float(camera.far()));
    }

    fn read_fields(record: &ComponentRecord) -> Self {
        let mut component = Self::new();
        let default_aspect = component.camera().aspect_ratio();
        let camera = component.camera_mut();
        camera.set_aspect_ratio(record.float_or("aspect_ratio", default_aspect));
        camera.set_vertical_fov(record.float_or("vertical_fov", DEFAULT_VERTICAL_FOV));
        camera.set_near(record.float_or("near", DEFAULT_NEAR));
        camera.set_far(record.float_or("far", DEFAULT_FAR));
        camera.calculate_view_matrix();
        component
    }
}

impl Component {
    /// Record for whichever component this is
    pub fn to_record(&self) -> ComponentRecord {
        match self {
            Self::Mesh(mesh) => mesh.to_record(),
            Self::Material(material) => material.to_record(),
            Self::Camera(camera) => camera.to_record(),
        }
    }

    /// Rebuild a registry component; transform records yield `None`
    pub fn from_record(record: &ComponentRecord) -> Option<Self> {
        match record.kind {
            ComponentKind::Transform => None,
            ComponentKind::Mesh => Some(Self::Mesh(MeshComponent::read_fields(record))),
            ComponentKind::Material => Some(Self::Material(MaterialComponent::read_fields(record))),
            ComponentKind::Camera => Some(Self::Camera(CameraComponent::read_fields(record))),
        }
    }
}

impl SceneNode {
    /// Record of this node under the given parent id
    pub fn to_record(&self, parent_id: Option<ObjectId>) -> NodeRecord {
        let components = std::iter::once(self.transform().to_record())
            .chain(self.components().iter().map(Component::to_record))
            .collect();
        NodeRecord {
            name: self.name().to_string(),
            id: self.id().0,
            parent_id: parent_id.map(|id| id.0),
            components,
        }
    }

    fn apply_records(&mut self, records: &[ComponentRecord]) {
        for record in records {
            match Component::from_record(record) {
                Some(Component::Mesh(mesh)) => {
                    self.add_component(mesh);
                }
                Some(Component::Material(material)) => {
                    self.add_component(material);
                }
                Some(Component::Camera(camera)) => {
                    self.add_component(camera);
                }
                None => *self.transform_mut() = TransformComponent::read_fields(record),
            }
        }
    }
}

impl SceneGraph {
    /// Records for every node reachable from the root, parents first
    pub fn snapshot(&self) -> Vec<NodeRecord> {
        let mut records = Vec::with_capacity(self.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let parent_id = node.parent().and_then(|parent| self.node(parent)).map(SceneNode::id);
            records.push(node.to_record(parent_id));
            stack.extend(node.children().iter().rev().copied());
        }
        records
    }

    /// Rebuild a graph from records
    ///
    /// The first record without a parent becomes the root, wherever it sits
    /// in the list. Records whose parent is unknown, and further parentless
    /// records, are attached under the root; duplicate ids are skipped.
    /// Record ids only link parents to children: every loaded node gets a
    /// fresh object id. The root keeps its transform but drops any other
    /// component. Each problem is logged.
    pub fn from_records(records: &[NodeRecord], settings: SceneSettings) -> Self {
        let mut graph = Self::with_settings(settings);
        let root = graph.root();
        let mut by_id: HashMap<u64, NodeId> = HashMap::new();
        let mut links: Vec<(NodeId, Option<u64>)> = Vec::new();

        let root_index = records.iter().position(|record| record.parent_id.is_none());
        if let Some(record) = root_index.map(|index| &records[index]) {
            let (transforms, dropped): (Vec<ComponentRecord>, Vec<ComponentRecord>) = record
                .components
                .iter()
                .cloned()
                .partition(|component| component.kind == ComponentKind::Transform);
            for component in &dropped {
                log::warn!(
                    "Root record '{}' carries a {} component, ignored",
                    record.name,
                    component.kind.name()
                );
            }
            if let Some(node) = graph.node_mut(root) {
                node.set_name(record.name.clone());
                node.apply_records(&transforms);
            }
            by_id.insert(record.id, root);
        }

        for (index, record) in records.iter().enumerate() {
            if Some(index) == root_index {
                continue;
            }
            if by_id.contains_key(&record.id) {
                log::warn!("Duplicate node id {} ('{}'), skipped", record.id, record.name);
                continue;
            }

            let object_id = graph.allocate_object_id();
            let mut node = SceneNode::new(record.name.clone(), object_id);
            node.apply_records(&record.components);
            let id = graph.insert_detached(node);
            by_id.insert(record.id, id);
            links.push((id, record.parent_id));
        }

        for (id, parent_id) in links {
            let parent = match parent_id.and_then(|parent| by_id.get(&parent).copied()) {
                Some(parent) => parent,
                None => {
                    log::warn!("Node {:?} has no loaded parent, attaching under the root", parent_id);
                    root
                }
            };
            if let Err(err) = graph.adopt(parent, id) {
                log::warn!("Could not link loaded node: {}, attaching under the root", err);
                if let Err(err) = graph.adopt(root, id) {
                    log::warn!("Could not link loaded node under the root: {}", err);
                }
            }
        }

        graph.propagate_transforms();
        log::info!("Loaded {} node(s)", graph.len());
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_fields_are_ordered() {
        let mut transform = TransformComponent::new();
        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        let record = transform.to_record();

        let names: Vec<&str> = record.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["position", "rotation", "scale"]);
        assert_eq!(record.kind, ComponentKind::Transform);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut record = ComponentRecord::new(ComponentKind::Camera);
        record.push("vertical_fov", FieldValue::Float(45.0));
        record.push("near", FieldValue::Text("oops".to_string()));

        let camera = CameraComponent::read_fields(&record);
        assert_relative_eq!(camera.camera().vertical_fov(), 45.0);
        assert_relative_eq!(camera.camera().near(), DEFAULT_NEAR);
        assert_relative_eq!(camera.camera().far(), DEFAULT_FAR);
    }

    #[test]
    fn test_degenerate_quaternion_becomes_identity() {
        let mut record = ComponentRecord::new(ComponentKind::Transform);
        record.push("rotation", FieldValue::Quat([0.0; 4]));
        let transform = TransformComponent::read_fields(&record);
        assert_relative_eq!(transform.rotation(), Quat::identity());
        assert_relative_eq!(transform.scale(), Vec3::repeat(1.0));
    }

    #[test]
    fn test_mesh_record_regenerates_primitive() {
        let mut mesh = MeshComponent::primitive(PrimitiveShape::Sphere);
        mesh.flags = MeshDrawFlags::OBB | MeshDrawFlags::WIREFRAME;
        mesh.normal_scale = 0.25;

        let rebuilt = MeshComponent::read_fields(&mesh.to_record());
        assert_eq!(rebuilt.source(), &MeshSource::Primitive(PrimitiveShape::Sphere));
        assert_eq!(rebuilt.vertex_count(), mesh.vertex_count());
        assert_eq!(rebuilt.flags, mesh.flags);
        assert_relative_eq!(rebuilt.normal_scale, 0.25);
    }

    #[test]
    fn test_material_round_trip() {
        let material = MaterialComponent::with_texture("bricks.png", 12, 256, 128);
        assert_eq!(MaterialComponent::read_fields(&material.to_record()), material);
    }
}
