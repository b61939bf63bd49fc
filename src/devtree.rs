///// Otter: Geraetebaum-Schnittstelle + Aufstiegslauf (Lookup -> Parent-Kette -> Muster).
///// Schneefuchs: Ok(None) bei parent() heisst Wurzel; Err heisst Lookup-Fehler – sauber getrennt.
///// Maus: Kein gehaltener Graph, nur ein Cursor; Fehler mitten im Lauf beenden ihn wie die Wurzel.
///// Datei: src/devtree.rs

use crate::pattern::IdPattern;
use crate::term::{out_info, out_warn};

/// Opakes Handle auf eine Position im lebenden Geraetebaum (DEVINST auf Windows).
/// Nur fuer die Prozesslebensdauer gueltig; wird nie persistiert.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DevNode(pub(crate) u32);

/// Fehler der Geraetebaum-Schicht.
#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
    /// Die Enumeration selbst war nicht zu bekommen (SetupDiGetClassDevs schlug fehl).
    SetUnavailable,
    /// Ein einzelner Knoten-Lookup schlug fehl (CM_Get_Parent / CM_Get_Device_ID).
    NodeLookup(String),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::SetUnavailable => write!(f, "device information set unavailable"),
            TreeError::NodeLookup(what) => write!(f, "device node lookup failed: {}", what),
        }
    }
}

/// Die drei Operationen, die das Werkzeug vom OS braucht.
/// Die Enumeration ist ein Schnappschuss zum Aufrufzeitpunkt; Reihenfolge unspezifiziert.
pub trait DeviceTree {
    /// Alle praesenten Geraete, eingeschraenkt durch `filter` (Enumerator-String).
    fn devices(&self, filter: &str) -> Result<Vec<(String, DevNode)>, TreeError>;

    /// Unmittelbarer Parent; `Ok(None)` ist die Baumwurzel.
    fn parent(&self, node: DevNode) -> Result<Option<DevNode>, TreeError>;

    /// Kanonische Device Instance ID eines Knotens.
    fn instance_id(&self, node: DevNode) -> Result<String, TreeError>;
}

/// Ergebnis des Aufstiegslaufs.
#[derive(Debug, PartialEq, Eq)]
pub enum WalkReport {
    /// Ein Vorfahr passte auf das Muster; traegt dessen Device Instance ID.
    Matched(String),
    /// Geraet gefunden, aber kein Vorfahr passte (oder es gab keinen Parent).
    NoAncestorMatched,
    /// Kein Geraet im Schnappschuss entsprach der gesuchten ID.
    DeviceNotFound,
}

/// Sucht `target_id` im Geraeteschnappschuss (ASCII-case-insensitiv, erster Treffer gewinnt)
/// und steigt dann Parent fuer Parent auf, bis eine ID `pattern` ganz matcht oder die
/// Wurzel erreicht ist. Lookup-Fehler mitten im Lauf beenden ihn wie die Wurzel
/// (mit Warnung), damit sich das Werkzeug an der Baumspitze nie aufhaengt.
pub fn find_matching_ancestor(
    tree: &dyn DeviceTree,
    target_id: &str,
    pattern: &IdPattern,
) -> Result<WalkReport, TreeError> {
    let snapshot = tree.devices(target_id)?;
    out_info("TREE", &format!("snapshot holds {} device(s)", snapshot.len()));

    let Some((found_id, start)) = snapshot
        .into_iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(target_id))
    else {
        return Ok(WalkReport::DeviceNotFound);
    };
    out_info("TREE", &format!("resolved {:?}", found_id));

    let mut current = start;
    loop {
        let parent = match tree.parent(current) {
            Ok(Some(p)) => p,
            Ok(None) => return Ok(WalkReport::NoAncestorMatched),
            Err(e) => {
                out_warn("TREE", &format!("parent lookup failed, treating as root: {}", e));
                return Ok(WalkReport::NoAncestorMatched);
            }
        };
        let parent_id = match tree.instance_id(parent) {
            Ok(id) => id,
            Err(e) => {
                out_warn("TREE", &format!("identifier lookup failed, treating as root: {}", e));
                return Ok(WalkReport::NoAncestorMatched);
            }
        };
        if pattern.matches(&parent_id) {
            return Ok(WalkReport::Matched(parent_id));
        }
        out_info("TREE", &format!("no match at {:?}, climbing", parent_id));
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-Memory-Baum: Knoten i hat ID ids[i] und Parent parents[i].
    struct FakeTree {
        ids: Vec<&'static str>,
        parents: Vec<Option<u32>>,
        enumeration_fails: bool,
        parent_fails_at: Option<u32>,
    }

    impl FakeTree {
        fn chain() -> Self {
            // A\X\1 -> B\Y\2 -> C\Z\3 (Wurzel)
            FakeTree {
                ids: vec![r"A\X\1", r"B\Y\2", r"C\Z\3"],
                parents: vec![Some(1), Some(2), None],
                enumeration_fails: false,
                parent_fails_at: None,
            }
        }
    }

    impl DeviceTree for FakeTree {
        fn devices(&self, _filter: &str) -> Result<Vec<(String, DevNode)>, TreeError> {
            if self.enumeration_fails {
                return Err(TreeError::SetUnavailable);
            }
            Ok(self
                .ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.to_string(), DevNode(i as u32)))
                .collect())
        }

        fn parent(&self, node: DevNode) -> Result<Option<DevNode>, TreeError> {
            if self.parent_fails_at == Some(node.0) {
                return Err(TreeError::NodeLookup("injected failure".into()));
            }
            Ok(self.parents[node.0 as usize].map(DevNode))
        }

        fn instance_id(&self, node: DevNode) -> Result<String, TreeError> {
            Ok(self.ids[node.0 as usize].to_string())
        }
    }

    fn walk(tree: &FakeTree, target: &str, pattern: &str) -> Result<WalkReport, TreeError> {
        let p = IdPattern::compile(pattern).unwrap();
        find_matching_ancestor(tree, target, &p)
    }

    #[test]
    fn match_anything_returns_immediate_parent() {
        let tree = FakeTree::chain();
        assert_eq!(
            walk(&tree, r"A\X\1", ".*").unwrap(),
            WalkReport::Matched(r"B\Y\2".into())
        );
    }

    #[test]
    fn pattern_skips_to_grandparent() {
        let tree = FakeTree::chain();
        assert_eq!(
            walk(&tree, r"A\X\1", r"C\\.*").unwrap(),
            WalkReport::Matched(r"C\Z\3".into())
        );
    }

    #[test]
    fn no_ancestor_matches() {
        let tree = FakeTree::chain();
        assert_eq!(
            walk(&tree, r"A\X\1", "NOPE.*").unwrap(),
            WalkReport::NoAncestorMatched
        );
    }

    #[test]
    fn absent_device_is_not_found() {
        let tree = FakeTree::chain();
        assert_eq!(
            walk(&tree, r"D\Q\9", ".*").unwrap(),
            WalkReport::DeviceNotFound
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let tree = FakeTree::chain();
        assert_eq!(
            walk(&tree, r"a\x\1", ".*").unwrap(),
            WalkReport::Matched(r"B\Y\2".into())
        );
    }

    #[test]
    fn root_device_has_no_ancestors() {
        let tree = FakeTree::chain();
        assert_eq!(
            walk(&tree, r"C\Z\3", ".*").unwrap(),
            WalkReport::NoAncestorMatched
        );
    }

    #[test]
    fn enumeration_failure_propagates() {
        let mut tree = FakeTree::chain();
        tree.enumeration_fails = true;
        assert_eq!(walk(&tree, r"A\X\1", ".*"), Err(TreeError::SetUnavailable));
    }

    #[test]
    fn parent_failure_midwalk_ends_like_root() {
        let mut tree = FakeTree::chain();
        // B\Y\2 liefert keinen Parent mehr; "C\\.*" kann also nie treffen.
        tree.parent_fails_at = Some(1);
        assert_eq!(
            walk(&tree, r"A\X\1", r"C\\.*").unwrap(),
            WalkReport::NoAncestorMatched
        );
    }

    #[test]
    fn walk_is_idempotent() {
        let tree = FakeTree::chain();
        let first = walk(&tree, r"A\X\1", r"C\\.*").unwrap();
        let second = walk(&tree, r"A\X\1", r"C\\.*").unwrap();
        assert_eq!(first, second);
    }
}
