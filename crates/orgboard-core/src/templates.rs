//! Built-in starting charts.

use crate::color::SerializableColor;
use crate::error::{ChartError, ChartResult};
use crate::geometry::Geometry;
use crate::layout::{LayoutConfig, auto_layout};
use crate::node::{Node, NodeType};
use crate::store::{EntityStore, Snapshot};

/// Names accepted by [`template`].
pub const TEMPLATE_NAMES: &[&str] = &["blank", "startup", "corporate"];

/// Build a named template laid out with the default spacing.
pub fn template(name: &str) -> ChartResult<Snapshot> {
    build_template(name, &LayoutConfig::default())
}

/// Build a named template laid out with `config`.
pub fn build_template(name: &str, config: &LayoutConfig) -> ChartResult<Snapshot> {
    let mut store = EntityStore::new();
    match name {
        "blank" => return Ok(store.snapshot()),
        "startup" => startup(&mut store)?,
        "corporate" => corporate(&mut store)?,
        other => return Err(ChartError::UnknownTemplate(other.to_string())),
    }
    auto_layout(&mut store, config);
    if name == "corporate" {
        pin_note(&mut store, "hiring-note", "group-engineering");
    }
    log::debug!("Built template {:?} with {} nodes", name, store.len());
    Ok(store.snapshot())
}

/// Small helper that keeps ids readable and inserts nodes with a placeholder geometry.
struct Builder<'a> {
    store: &'a mut EntityStore,
}

impl Builder<'_> {
    fn group(&mut self, id: &str, name: &str, tint: &str) {
        let mut node = Node::with_id(id, NodeType::Group, name);
        node.style.background_color = SerializableColor::from_hex(tint);
        node.style.border_color = SerializableColor::from_hex("#94a3b8");
        self.store.insert(node, Geometry::sized(0.0, 0.0, 400.0, 300.0));
    }

    fn person(&mut self, id: &str, node_type: NodeType, name: &str, role: &str, department: &str) {
        let mut node = Node::with_id(id, node_type, name)
            .with_role(role)
            .with_department(department);
        if let Some(person) = node.person_mut() {
            person.level = match node_type {
                NodeType::Executive => 1,
                NodeType::Manager => 2,
                _ => 3,
            };
        }
        self.store.insert(node, Geometry::at(0.0, 0.0));
    }

    fn reports(&mut self, manager: &str, reports: &[&str]) -> ChartResult<()> {
        for report in reports {
            self.store.link(manager, report)?;
        }
        Ok(())
    }
}

fn startup(store: &mut EntityStore) -> ChartResult<()> {
    let mut b = Builder { store };
    b.group("group-engineering", "Engineering", "#e0f2fe");
    b.group("group-finance", "Finance", "#fef3c7");

    b.person("ceo", NodeType::Executive, "Alex Rivera", "CEO", "");
    b.person("cto", NodeType::Manager, "Sam Chen", "CTO", "Engineering");
    b.person("dev-1", NodeType::Employee, "Jordan Lee", "Engineer", "Engineering");
    b.person("dev-2", NodeType::Employee, "Riley Park", "Engineer", "Engineering");
    b.person("cfo", NodeType::Manager, "Morgan Diaz", "CFO", "Finance");
    b.person("acct-1", NodeType::Employee, "Casey Brooks", "Accountant", "Finance");

    b.reports("ceo", &["cto", "cfo"])?;
    b.reports("cto", &["dev-1", "dev-2"])?;
    b.reports("cfo", &["acct-1"])
}

fn corporate(store: &mut EntityStore) -> ChartResult<()> {
    let mut b = Builder { store };
    b.group("group-engineering", "Engineering", "#e0f2fe");
    b.group("group-sales", "Sales", "#dcfce7");
    b.group("group-finance", "Finance", "#fef3c7");

    b.person("ceo", NodeType::Executive, "Dana Whitfield", "Chief Executive Officer", "");
    b.person("vp-eng", NodeType::Manager, "Priya Nair", "VP Engineering", "Engineering");
    b.person("vp-sales", NodeType::Manager, "Tomás Ortega", "VP Sales", "Sales");
    b.person("cfo", NodeType::Manager, "Henrik Olsen", "CFO", "Finance");

    b.person("eng-1", NodeType::Employee, "Mei Tanaka", "Staff Engineer", "Engineering");
    b.person("eng-2", NodeType::Employee, "Luca Romano", "Backend Engineer", "Engineering");
    b.person("eng-3", NodeType::Employee, "Ada Okafor", "Frontend Engineer", "Engineering");
    b.person("sales-1", NodeType::Employee, "Noah Kim", "Account Executive", "Sales");
    b.person("sales-2", NodeType::Employee, "Sara Lind", "Sales Engineer", "Sales");
    b.person("fin-1", NodeType::Employee, "Omar Haddad", "Controller", "Finance");

    b.reports("ceo", &["vp-eng", "vp-sales", "cfo"])?;
    b.reports("vp-eng", &["eng-1", "eng-2", "eng-3"])?;
    b.reports("vp-sales", &["sales-1", "sales-2"])?;
    b.reports("cfo", &["fin-1"])?;

    let mut note = Node::with_id("hiring-note", NodeType::Note, "Hiring two engineers in Q3");
    if let Some(typography) = note.typography_mut() {
        typography.font_size = 14.0;
    }
    note.style.background_color = SerializableColor::from_hex("#fef9c3");
    b.store.insert(note, Geometry::sized(0.0, 0.0, 180.0, 40.0));
    Ok(())
}

/// Put a note inside the bottom padding of a group so later layouts carry it along.
fn pin_note(store: &mut EntityStore, note: &str, group: &str) {
    let Some(rect) = store.node_rect(group) else {
        return;
    };
    if let Some(geometry) = store.geometry_mut(note) {
        geometry.x = rect.x0 + 10.0;
        geometry.y = rect.y1 - 45.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank() {
        let snapshot = template("blank").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_unknown() {
        assert!(matches!(
            template("galaxy"),
            Err(ChartError::UnknownTemplate(name)) if name == "galaxy"
        ));
    }

    #[test]
    fn test_all_templates_valid() {
        for name in TEMPLATE_NAMES {
            let store = EntityStore::from_snapshot(template(name).unwrap()).unwrap();
            assert!(store.validate_topology().is_ok(), "{name}");
        }
    }

    #[test]
    fn test_departments_match_overlap() {
        for name in ["startup", "corporate"] {
            let mut store = EntityStore::from_snapshot(template(name).unwrap()).unwrap();
            let before = store.snapshot();
            assert_eq!(store.update_all_membership(), 0, "{name}");
            assert_eq!(store.snapshot(), before);
        }
    }

    #[test]
    fn test_corporate_note_inside_group() {
        let store = EntityStore::from_snapshot(template("corporate").unwrap()).unwrap();
        let note = store.node_rect("hiring-note").unwrap();
        let group = store.node_rect("group-engineering").unwrap();
        assert!(group.contains(note.center()));
        assert_eq!(store.groups().count(), 3);
    }

    #[test]
    fn test_templates_are_stable_under_layout() {
        let mut store = EntityStore::from_snapshot(template("corporate").unwrap()).unwrap();
        let before = store.snapshot();
        auto_layout(&mut store, &LayoutConfig::default());
        assert_eq!(store.snapshot(), before);
    }
}
