//! Arena-owned ownership tree of operators and instances.
//!
//! Nodes live in a single `Vec` owned by [`CsgTree`]; children and parent
//! links are [`NodeId`] indices into it. Nodes are only ever appended, so the
//! structure cannot contain cycles.

use serde::Serialize;

use crate::registry::HierarchyPath;

/// Display name of the root sentinel node.
pub const ROOT_NAME: &str = "root";

/// Index of a node in its [`CsgTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a node is a block or a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeCategory {
    /// Block-scoped operation with children.
    Operator,
    /// Leaf primitive statement.
    Instance,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Assigned variant id (`union0`, `cube3`), or [`ROOT_NAME`].
    pub display_name: String,
    /// Operation name as written in the source; `None` for the root.
    pub kind: Option<String>,
    /// Operator or instance.
    pub category: NodeCategory,
    /// Parameter text exactly as captured.
    pub raw_params: String,
    /// Children in source order.
    pub children: Vec<NodeId>,
    /// Enclosing operator; `None` for the root.
    pub parent: Option<NodeId>,
    /// Source line (1-indexed); 0 for the root.
    pub line: usize,
}

impl Node {
    /// Whether this is the root sentinel.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node opens a block.
    pub fn is_operator(&self) -> bool {
        self.category == NodeCategory::Operator
    }
}

/// The reconstructed scene tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsgTree {
    nodes: Vec<Node>,
}

impl Default for CsgTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CsgTree {
    /// Create a tree holding only the root sentinel.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                display_name: ROOT_NAME.to_string(),
                kind: None,
                category: NodeCategory::Operator,
                raw_params: String::new(),
                children: Vec::new(),
                parent: None,
                line: 0,
            }],
        }
    }

    /// Id of the root sentinel.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Children of `id`, in source order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// Parent of `id`; `None` for the root or an unknown id.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Display names of the enclosing operators, outermost first, excluding
    /// the root and the node itself.
    ///
    /// For an instance this equals the hierarchy path recorded when it was
    /// registered.
    pub fn path_of(&self, id: NodeId) -> HierarchyPath {
        let mut path: HierarchyPath = self
            .ancestors(id)
            .filter(|&a| a != self.root())
            .filter_map(|a| self.get(a))
            .map(|n| n.display_name.clone())
            .collect();
        path.reverse();
        path
    }

    /// Depth-first pre-order walk from the root, yielding `(depth, id)`.
    ///
    /// The root has depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![(0, self.root())],
        }
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of operator nodes, excluding the root.
    pub fn operator_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| !n.is_root() && n.is_operator())
            .count()
    }

    /// Number of instance nodes.
    pub fn instance_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_operator()).count()
    }

    /// Maximum operator nesting depth (0 for a flat file).
    pub fn max_depth(&self) -> usize {
        self.walk()
            .filter(|&(_, id)| self.get(id).is_some_and(|n| n.is_operator()))
            .map(|(depth, _)| depth)
            .max()
            .unwrap_or(0)
    }

    /// Append a node as the last child of `parent` and return its id.
    pub(crate) fn push_child(
        &mut self,
        parent: NodeId,
        display_name: String,
        kind: &str,
        category: NodeCategory,
        raw_params: &str,
        line: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            display_name,
            kind: Some(kind.to_string()),
            category,
            raw_params: raw_params.to_string(),
            children: Vec::new(),
            parent: Some(parent),
            line,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl std::ops::Index<NodeId> for CsgTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

/// Pre-order iterator returned by [`CsgTree::walk`].
pub struct Walk<'a> {
    tree: &'a CsgTree,
    stack: Vec<(usize, NodeId)>,
}

impl Iterator for Walk<'_> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        self.stack.extend(
            self.tree
                .children(id)
                .iter()
                .rev()
                .map(|&child| (depth + 1, child)),
        );
        Some((depth, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> union0 -> { cube0, multmatrix0 -> sphere0 }, cylinder0
    fn sample() -> (CsgTree, [NodeId; 5]) {
        let mut tree = CsgTree::new();
        let root = tree.root();
        let union = tree.push_child(root, "union0".into(), "union", NodeCategory::Operator, "", 1);
        let cube = tree.push_child(union, "cube0".into(), "cube", NodeCategory::Instance, "size=1", 2);
        let mm = tree.push_child(union, "multmatrix0".into(), "multmatrix", NodeCategory::Operator, "[[1]]", 3);
        let sphere = tree.push_child(mm, "sphere0".into(), "sphere", NodeCategory::Instance, "r=1", 4);
        let cyl = tree.push_child(root, "cylinder0".into(), "cylinder", NodeCategory::Instance, "h=2", 7);
        (tree, [union, cube, mm, sphere, cyl])
    }

    #[test]
    fn test_new_tree() {
        let tree = CsgTree::new();
        let root = &tree[tree.root()];
        assert_eq!(root.display_name, ROOT_NAME);
        assert_eq!(root.kind, None);
        assert!(root.is_root());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.max_depth(), 0);
    }

    #[test]
    fn test_links() {
        let (tree, [union, cube, mm, sphere, cyl]) = sample();
        assert_eq!(tree.children(tree.root()), &[union, cyl]);
        assert_eq!(tree.children(union), &[cube, mm]);
        assert_eq!(tree.parent(sphere), Some(mm));
        assert_eq!(tree.parent(tree.root()), None);
        assert!(tree.children(cube).is_empty());
        assert_eq!(tree[sphere].kind.as_deref(), Some("sphere"));
        assert_eq!(tree[sphere].line, 4);
    }

    #[test]
    fn test_each_node_listed_once_by_its_parent() {
        let (tree, _) = sample();
        for (_, id) in tree.walk().skip(1) {
            let parent = tree.parent(id).unwrap();
            let hits = tree.children(parent).iter().filter(|&&c| c == id).count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_walk_preorder() {
        let (tree, _) = sample();
        let visited: Vec<_> = tree
            .walk()
            .map(|(depth, id)| (depth, tree[id].display_name.as_str()))
            .collect();
        assert_eq!(
            visited,
            [
                (0, "root"),
                (1, "union0"),
                (2, "cube0"),
                (2, "multmatrix0"),
                (3, "sphere0"),
                (1, "cylinder0"),
            ]
        );
        assert_eq!(tree.walk().count(), tree.len());
    }

    #[test]
    fn test_paths_and_ancestors() {
        let (tree, [union, _, mm, sphere, cyl]) = sample();
        assert_eq!(tree.ancestors(sphere).collect::<Vec<_>>(), [mm, union, tree.root()]);
        assert_eq!(tree.path_of(sphere), ["union0", "multmatrix0"]);
        assert!(tree.path_of(cyl).is_empty());
        assert!(tree.path_of(tree.root()).is_empty());
    }

    #[test]
    fn test_counts() {
        let (tree, _) = sample();
        assert_eq!(tree.operator_count(), 2);
        assert_eq!(tree.instance_count(), 3);
        assert_eq!(tree.max_depth(), 2);
    }
}
