//! Node records for the chart.
//!
//! A node is a base record (identity, display fields, hierarchy edges, styling) plus a
//! [`NodeKind`] payload whose shape depends on the node type. Type-specific fields such as
//! `shapeType` are only reachable on the variants that carry them.

use crate::color::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = String;

/// Generate a fresh unique identifier for a node or drawing.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Node type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Executive,
    Manager,
    Employee,
    Note,
    Shape,
    Group,
    Text,
}

impl NodeType {
    /// Whether nodes of this type take part in the hierarchy layout.
    pub fn is_functional(&self) -> bool {
        matches!(
            self,
            NodeType::Executive | NodeType::Manager | NodeType::Employee
        )
    }

    /// Whether nodes of this type are freeform annotations that ride along with groups.
    pub fn is_annotation(&self) -> bool {
        matches!(self, NodeType::Note | NodeType::Shape | NodeType::Text)
    }

    /// Size used when a geometry has no explicit width/height.
    pub fn default_size(&self) -> Size {
        match self {
            NodeType::Executive | NodeType::Manager | NodeType::Employee => {
                Size::new(240.0, 100.0)
            }
            NodeType::Note => Size::new(200.0, 160.0),
            NodeType::Shape => Size::new(120.0, 120.0),
            NodeType::Group => Size::new(400.0, 300.0),
            NodeType::Text => Size::new(200.0, 40.0),
        }
    }

    /// Lowercase name as used in the export format.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Executive => "executive",
            NodeType::Manager => "manager",
            NodeType::Employee => "employee",
            NodeType::Note => "note",
            NodeType::Shape => "shape",
            NodeType::Group => "group",
            NodeType::Text => "text",
        }
    }

    pub fn all() -> &'static [NodeType] {
        &[
            NodeType::Executive,
            NodeType::Manager,
            NodeType::Employee,
            NodeType::Note,
            NodeType::Shape,
            NodeType::Group,
            NodeType::Text,
        ]
    }
}

/// Avatar shown on a person card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "avatarType", rename_all = "lowercase")]
pub enum Avatar {
    Image {
        #[serde(rename = "avatarImage")]
        src: String,
    },
    Icon {
        #[serde(rename = "avatarIcon")]
        icon: String,
    },
}

/// Payload of executive/manager/employee nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Person {
    /// Organizational grade.
    pub level: u32,
    pub avatar: Option<Avatar>,
}

/// Outline of a shape node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    #[default]
    Rectangle,
    Ellipse,
    Diamond,
    Triangle,
}

/// Payload of shape nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeProps {
    pub shape_type: ShapeType,
    pub border_radius: f64,
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Bold,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Typography of note and text nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_weight: FontWeight::default(),
            text_align: TextAlign::default(),
        }
    }
}

/// Type-specific part of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Executive(Person),
    Manager(Person),
    Employee(Person),
    Note(Typography),
    Shape(ShapeProps),
    Group,
    Text(Typography),
}

impl NodeKind {
    /// Default payload for a node type.
    pub fn for_type(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Executive => NodeKind::Executive(Person::default()),
            NodeType::Manager => NodeKind::Manager(Person::default()),
            NodeType::Employee => NodeKind::Employee(Person::default()),
            NodeType::Note => NodeKind::Note(Typography::default()),
            NodeType::Shape => NodeKind::Shape(ShapeProps::default()),
            NodeType::Group => NodeKind::Group,
            NodeType::Text => NodeKind::Text(Typography::default()),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Executive(_) => NodeType::Executive,
            NodeKind::Manager(_) => NodeType::Manager,
            NodeKind::Employee(_) => NodeType::Employee,
            NodeKind::Note(_) => NodeType::Note,
            NodeKind::Shape(_) => NodeType::Shape,
            NodeKind::Group => NodeType::Group,
            NodeKind::Text(_) => NodeType::Text,
        }
    }
}

/// Visual styling shared by all node types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStyle {
    pub background_color: Option<SerializableColor>,
    pub border_color: Option<SerializableColor>,
    pub text_color: Option<SerializableColor>,
    pub border_width: f64,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            background_color: None,
            border_color: None,
            text_color: None,
            border_width: 1.0,
        }
    }
}

/// A node in the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Name of the group this node geometrically belongs to (functional nodes only).
    #[serde(default)]
    pub department: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Ordered child ids. The only source of hierarchy edges.
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub style: NodeStyle,
}

impl Node {
    /// Create a node with a fresh id and the default payload for its type.
    pub fn new(node_type: NodeType, name: impl Into<String>) -> Self {
        Self::with_id(generate_id(), node_type, name)
    }

    /// Create a node with a specific id.
    pub fn with_id(id: impl Into<NodeId>, node_type: NodeType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: String::new(),
            department: String::new(),
            kind: NodeKind::for_type(node_type),
            children: Vec::new(),
            style: NodeStyle::default(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_functional(&self) -> bool {
        self.node_type().is_functional()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }

    pub fn is_annotation(&self) -> bool {
        self.node_type().is_annotation()
    }

    /// Person payload, if this is a functional node.
    pub fn person(&self) -> Option<&Person> {
        match &self.kind {
            NodeKind::Executive(p) | NodeKind::Manager(p) | NodeKind::Employee(p) => Some(p),
            _ => None,
        }
    }

    pub fn person_mut(&mut self) -> Option<&mut Person> {
        match &mut self.kind {
            NodeKind::Executive(p) | NodeKind::Manager(p) | NodeKind::Employee(p) => Some(p),
            _ => None,
        }
    }

    /// Shape payload, if this is a shape node.
    pub fn shape_props(&self) -> Option<&ShapeProps> {
        match &self.kind {
            NodeKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Typography, if this is a note or text node.
    pub fn typography(&self) -> Option<&Typography> {
        match &self.kind {
            NodeKind::Note(t) | NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn typography_mut(&mut self) -> Option<&mut Typography> {
        match &mut self.kind {
            NodeKind::Note(t) | NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Builder-style role setter.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Builder-style department setter.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }
}

/// Partial update of node fields.
///
/// Fields left as `None` are untouched. Fields that do not exist on a node's variant
/// (e.g. `shape_type` on an employee) are ignored for that node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub level: Option<u32>,
    pub avatar: Option<Avatar>,
    pub shape_type: Option<ShapeType>,
    pub border_radius: Option<f64>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub text_align: Option<TextAlign>,
    pub background_color: Option<SerializableColor>,
    pub border_color: Option<SerializableColor>,
    pub text_color: Option<SerializableColor>,
    pub border_width: Option<f64>,
}

impl NodePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to a node.
    pub fn apply(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(role) = &self.role {
            node.role = role.clone();
        }
        if let Some(department) = &self.department {
            node.department = department.clone();
        }

        if let Some(person) = node.person_mut() {
            if let Some(level) = self.level {
                person.level = level;
            }
            if let Some(avatar) = &self.avatar {
                person.avatar = Some(avatar.clone());
            }
        }

        if let NodeKind::Shape(shape) = &mut node.kind {
            if let Some(shape_type) = self.shape_type {
                shape.shape_type = shape_type;
            }
            if let Some(radius) = self.border_radius {
                shape.border_radius = radius.max(0.0);
            }
        }

        if let Some(typography) = node.typography_mut() {
            if let Some(size) = self.font_size {
                typography.font_size = size;
            }
            if let Some(weight) = self.font_weight {
                typography.font_weight = weight;
            }
            if let Some(align) = self.text_align {
                typography.text_align = align;
            }
        }

        if let Some(color) = self.background_color {
            node.style.background_color = Some(color);
        }
        if let Some(color) = self.border_color {
            node.style.border_color = Some(color);
        }
        if let Some(color) = self.text_color {
            node.style.text_color = Some(color);
        }
        if let Some(width) = self.border_width {
            node.style.border_width = width.max(0.0);
        }
    }
}
