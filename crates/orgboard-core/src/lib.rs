//! OrgBoard Core Library
//!
//! Chart state engine for the OrgBoard org-chart and whiteboard editor: entity store,
//! hierarchy, group membership, auto-layout, history and clipboard.

pub mod chart;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod membership;
pub mod node;
pub mod path;
pub mod selection;
pub mod store;
pub mod templates;
pub mod topology;
pub mod viewport;

pub use chart::Chart;
pub use clipboard::{Clipboard, ClipboardEntry, Pasted};
pub use color::SerializableColor;
pub use config::ChartConfig;
pub use drawing::{Drawing, DrawingId};
pub use error::{ChartError, ChartResult};
pub use geometry::Geometry;
pub use history::History;
pub use layout::{LayoutConfig, LayoutReport, auto_layout};
pub use node::{Node, NodeId, NodeKind, NodePatch, NodeType};
pub use selection::Selection;
pub use store::{EntityStore, Snapshot};
pub use templates::{TEMPLATE_NAMES, template};
pub use topology::Edge;
pub use viewport::Viewport;
