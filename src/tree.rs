//! The persisted Monte Carlo tree.
//!
//! Nodes store no board: the position of a node is rebuilt by replaying its `move_history` from
//! the initial position. The whole tree is kept in one JSON document under the `start` key.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
    constants::{EXPLORATION_CONSTANT, EXPLORATION_EPSILON, TREE_FILE_INDENT, VISITS_EPSILON},
    error::{EngineError, EngineResult},
};

/// A node of the search tree.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MctsNode {
    /// Moves from the initial position to this node, in `e2e4` notation.
    pub move_history: Vec<String>,

    /// Cached copy of the parent's visit count, only read by UCB1.
    pub parent_visits: u64,

    pub visits: u64,

    /// Accumulated result credit: 1 per win for this node's player, 0.5 per draw.
    pub win: f64,

    #[serde(default)]
    pub children: Vec<MctsNode>,
}

impl MctsNode {
    pub fn root() -> Self {
        MctsNode::default()
    }

    /// A fresh child reached by playing `notation` from this node.
    pub fn new_child(&self, notation: String) -> Self {
        let mut move_history = self.move_history.clone();
        move_history.push(notation);

        MctsNode {
            move_history,
            parent_visits: self.visits,
            visits: 0,
            win: 0.0,
            children: Vec::new(),
        }
    }

    pub fn last_move(&self) -> Option<&str> {
        self.move_history.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.move_history.len()
    }

    /// Upper confidence bound used to pick which child to descend into. Unvisited children score
    /// far above any visited sibling.
    pub fn ucb1(&self) -> f64 {
        let visits = self.visits as f64;
        let parent_visits = self.parent_visits as f64;

        let exploitation = self.win / (visits + VISITS_EPSILON);
        let exploration = ((parent_visits + VISITS_EPSILON).ln().max(0.0)
            / (visits + EXPLORATION_EPSILON))
            .sqrt();

        exploitation + EXPLORATION_CONSTANT * exploration
    }

    /// Empirical win rate, `None` for a node that was never visited.
    pub fn win_rate(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.win / self.visits as f64)
    }

    /// Whether this node lies on the path to the node with `history`.
    pub fn leads_to(&self, history: &[String]) -> bool {
        history.starts_with(&self.move_history)
    }

    /// Index of the child with the largest UCB1. The first child wins ties.
    pub fn best_child_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (index, child) in self.children.iter().enumerate() {
            let score = child.ucb1();
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        best.map(|(index, _)| index)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(MctsNode::size).sum::<usize>()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MctsTree {
    #[serde(rename = "start")]
    pub root: MctsNode,
}

impl MctsTree {
    pub fn new() -> Self {
        MctsTree {
            root: MctsNode::root(),
        }
    }

    /// Reads the whole tree. A missing or malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| io_error(path, source))?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| EngineError::TreeFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the whole tree to a temporary sibling file and renames it over `path`, so a reader
    /// never sees a half-written tree.
    pub fn save(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let path = path.as_ref();
        let temporary = temporary_path(path);

        let file = File::create(&temporary).map_err(|source| io_error(&temporary, source))?;
        let mut writer = BufWriter::new(file);

        let formatter = PrettyFormatter::with_indent(TREE_FILE_INDENT);
        let mut serializer = Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut serializer)
            .map_err(|source| EngineError::TreeFormat {
                path: temporary.clone(),
                source,
            })?;

        writer
            .flush()
            .map_err(|source| io_error(&temporary, source))?;
        drop(writer);

        fs::rename(&temporary, path).map_err(|source| io_error(path, source))
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_inherit_the_parent_visit_count() {
        let mut root = MctsNode::root();
        root.visits = 7;

        let child = root.new_child("e2e4".to_string());

        assert_eq!(child.parent_visits, 7);
        assert_eq!(child.move_history, vec!["e2e4".to_string()]);
        assert_eq!(child.visits, 0);
    }

    #[test]
    fn json_uses_the_start_key() {
        let json = serde_json::to_string(&MctsTree::new()).unwrap();
        assert!(json.starts_with("{\"start\":"), "got {}", json);
    }

    #[test]
    fn integer_win_values_are_accepted() {
        let json = r#"{"start": {"move_history": [], "parent_visits": 0, "visits": 2, "win": 1,
            "children": [{"move_history": ["e2e4"], "parent_visits": 2, "visits": 2, "win": 0.5, "children": []}]}}"#;

        let tree: MctsTree = serde_json::from_str(json).unwrap();

        assert_eq!(tree.root.win, 1.0);
        assert_eq!(tree.root.children[0].last_move(), Some("e2e4"));
    }

    #[test]
    fn prefix_test_follows_move_history() {
        let node = MctsNode {
            move_history: vec!["e2e4".to_string()],
            ..Default::default()
        };

        let line = vec!["e2e4".to_string(), "e7e5".to_string()];
        let other = vec!["d2d4".to_string()];

        assert!(node.leads_to(&line));
        assert!(!node.leads_to(&other));
        assert!(MctsNode::root().leads_to(&other));
    }
}
