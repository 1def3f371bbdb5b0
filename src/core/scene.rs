/// Scene graph: a strictly tree-shaped hierarchy of primitive shapes.
///
/// Every node owns its children. Parts are addressed with [`NodePath`]
/// handles (child-index paths) rather than name lookups; names are kept for
/// diagnostics and retrieval.
use glam::{EulerRot, Quat, Vec2, Vec3};
use std::fmt;
use std::sync::Arc;

use crate::core::texture::Texture;
use crate::schema::palette::Color;

/// Local transform relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn get(&self, property: Property) -> Vec3 {
        match property {
            Property::Position => self.position,
            Property::Rotation => self.rotation,
            Property::Scale => self.scale,
        }
    }

    pub fn set(&mut self, property: Property, value: Vec3) {
        match property {
            Property::Position => self.position = value,
            Property::Rotation => self.rotation = value,
            Property::Scale => self.scale = value,
        }
    }
}

/// A transform channel that motions animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Position,
    Rotation,
    Scale,
}

/// Geometry descriptor with its dimensions in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Capsule { cap_radius: f32, height: f32 },
    Sphere { radius: f32 },
    Torus { ring_radius: f32, pipe_radius: f32 },
    Cylinder { radius: f32, height: f32 },
    Pyramid { width: f32, height: f32, length: f32 },
    Box { width: f32, height: f32, length: f32, chamfer: f32 },
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Capsule { .. } => "capsule",
            Self::Sphere { .. } => "sphere",
            Self::Torus { .. } => "torus",
            Self::Cylinder { .. } => "cylinder",
            Self::Pyramid { .. } => "pyramid",
            Self::Box { .. } => "box",
        }
    }
}

/// Diffuse channel of a material.
#[derive(Debug, Clone, PartialEq)]
pub enum Diffuse {
    Color(Color),
    /// Repeating image texture, scaled by `tiling` in UV space.
    Texture { texture: Arc<Texture>, tiling: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: Diffuse,
    pub roughness: f32,
    pub metalness: f32,
}

impl Material {
    pub fn color(color: Color) -> Self {
        Self {
            diffuse: Diffuse::Color(color),
            roughness: 0.6,
            metalness: 0.0,
        }
    }

    pub fn texture(texture: Arc<Texture>, tiling: Vec2) -> Self {
        Self {
            diffuse: Diffuse::Texture { texture, tiling },
            roughness: 0.6,
            metalness: 0.0,
        }
    }

    pub fn rough(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn metal(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn texture_ref(&self) -> Option<&Arc<Texture>> {
        match &self.diffuse {
            Diffuse::Texture { texture, .. } => Some(texture),
            Diffuse::Color(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Omni,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { fov: 60.0 }
    }
}

/// A node in the scene tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub geometry: Option<Primitive>,
    pub material: Option<Material>,
    pub light: Option<Light>,
    pub camera: Option<Camera>,
    children: Vec<Node>,
}

impl Node {
    /// An empty pivot node with no geometry.
    pub fn pivot(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// A shape node with geometry and material.
    pub fn shape(geometry: Primitive, material: Material) -> Self {
        Self {
            geometry: Some(geometry),
            material: Some(material),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vec3::new(x, y, z);
        self
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.rotation = Vec3::new(x, y, z);
        self
    }

    pub fn scaled(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.scale = Vec3::new(x, y, z);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Append a child and return its index.
    pub fn add_child(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Drop every child.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Resolve a path relative to this node.
    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        let mut node = self;
        for &i in path.indices() {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let mut node = self;
        for &i in path.indices() {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Depth-first pre-order walk over this node and all descendants.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// First node (pre-order) carrying the given name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.iter().find(|n| n.is_named(name))
    }

    /// Path to the first node (pre-order) carrying the given name.
    pub fn find_path(&self, name: &str) -> Option<NodePath> {
        if self.is_named(name) {
            return Some(NodePath::root());
        }
        for (i, child) in self.children.iter().enumerate() {
            if let Some(sub) = child.find_path(name) {
                let mut indices = vec![i];
                indices.extend_from_slice(sub.indices());
                return Some(NodePath(indices));
            }
        }
        None
    }

    /// Number of nodes in the subtree carrying the given name.
    pub fn count_named(&self, name: &str) -> usize {
        self.iter().filter(|n| n.is_named(name)).count()
    }

    /// Total node count of the subtree, including this node.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Indented outline of the subtree, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.name().unwrap_or("·"));
        if let Some(g) = &self.geometry {
            out.push_str(" [");
            out.push_str(g.kind());
            out.push(']');
        }
        if self.light.is_some() {
            out.push_str(" (light)");
        }
        if self.camera.is_some() {
            out.push_str(" (camera)");
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Child-index path from a figure root to one of its descendants.
///
/// Paths are only meaningful for the tree they were produced with; against
/// any other tree they may resolve to nothing, which callers treat as a
/// no-op.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to the `index`th child of this path's node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Node {
        let mut root = Node::pivot("root");
        let mut body = Node::shape(
            Primitive::Capsule { cap_radius: 0.5, height: 1.8 },
            Material::color(Color::WHITE),
        )
        .named("body");
        body.add_child(Node::pivot("leftSh").at(-0.7, 0.52, 0.0));
        body.add_child(Node::pivot("rightSh").at(0.7, 0.52, 0.0));
        root.add_child(body);
        root.add_child(Node::pivot("extra"));
        root
    }

    #[test]
    fn path_resolution() {
        let root = sample_tree();
        let right = NodePath::root().child(0).child(1);
        assert!(root.get(&right).unwrap().is_named("rightSh"));
        assert!(root.get(&NodePath::root()).unwrap().is_named("root"));
        assert!(root.get(&NodePath::root().child(5)).is_none());
    }

    #[test]
    fn find_path_matches_get() {
        let root = sample_tree();
        let path = root.find_path("leftSh").unwrap();
        assert_eq!(path.indices(), &[0, 0]);
        assert_eq!(root.get(&path).unwrap().transform.position.x, -0.7);
        assert!(root.find_path("missing").is_none());
    }

    #[test]
    fn preorder_iteration() {
        let root = sample_tree();
        let names: Vec<_> = root.iter().filter_map(|n| n.name()).collect();
        assert_eq!(names, vec!["root", "body", "leftSh", "rightSh", "extra"]);
        assert_eq!(root.len(), 5);
    }

    #[test]
    fn mutation_through_path() {
        let mut root = sample_tree();
        let path = NodePath::root().child(0).child(0);
        root.get_mut(&path).unwrap().transform.rotation = Vec3::new(-1.2, 0.5, 0.0);
        assert_eq!(root.find("leftSh").unwrap().transform.rotation.y, 0.5);
    }

    #[test]
    fn clear_children_discards_subtree() {
        let mut root = sample_tree();
        root.clear_children();
        assert!(root.is_leaf());
        assert!(root.find("body").is_none());
    }

    #[test]
    fn transform_property_access() {
        let mut t = Transform::default();
        t.set(Property::Scale, Vec3::new(1.0, 0.1, 1.0));
        assert_eq!(t.get(Property::Scale).y, 0.1);
        assert_eq!(t.get(Property::Rotation), Vec3::ZERO);
        assert_eq!(t.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn outline_lists_every_node() {
        let root = sample_tree();
        let text = root.outline();
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("body [capsule]"));
    }

    #[test]
    fn path_debug_format() {
        assert_eq!(format!("{:?}", NodePath::root().child(0).child(3)), "/0/3");
    }
}
