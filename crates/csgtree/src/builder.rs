//! Single-pass tree builder.
//!
//! Drives the classifier over the input lines, resolves each call through the
//! operator or instance registry, and appends nodes under the current cursor.
//! The hierarchy stack holds the variant ids of the open operator blocks.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, info_span, trace, warn};

use crate::classify::{classify, LineKind};
use crate::error::{CsgError, Result};
use crate::registry::{HierarchyPath, VariantRegistry};
use crate::tree::{CsgTree, NodeCategory, NodeId};

/// A line that looked like a call but whose parameters could not be delimited
/// by the shortest-span match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLine {
    /// Line number (1-indexed).
    pub line: usize,
    /// Trimmed line text.
    pub text: String,
}

/// Completed result of a parse.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedCsg {
    /// Reconstructed block structure.
    pub tree: CsgTree,
    /// Variants of block operators.
    pub operators: VariantRegistry,
    /// Variants of leaf instances, with hierarchy paths.
    pub instances: VariantRegistry,
    /// Lines recovered with the shortest-span heuristic.
    pub warnings: Vec<MalformedLine>,
}

impl ParsedCsg {
    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Incremental builder: feed lines in order, then [`finish`](Self::finish).
pub struct TreeBuilder {
    tree: CsgTree,
    operators: VariantRegistry,
    instances: VariantRegistry,
    hierarchy: HierarchyPath,
    cursor: NodeId,
    warnings: Vec<MalformedLine>,
    line: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder positioned at the root with an empty stack.
    pub fn new() -> Self {
        let tree = CsgTree::new();
        let cursor = tree.root();
        Self {
            tree,
            operators: VariantRegistry::operators(),
            instances: VariantRegistry::instances(),
            hierarchy: Vec::new(),
            cursor,
            warnings: Vec::new(),
            line: 0,
        }
    }

    /// Variant ids of the currently open blocks, outermost first.
    pub fn hierarchy(&self) -> &[String] {
        &self.hierarchy
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Process the next line.
    ///
    /// Fails with [`CsgError::UnbalancedClose`] on a `}` with no open block.
    /// The builder must not be used further after an error.
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line += 1;
        let line = self.line;
        let classified = classify(raw);

        if classified.malformed {
            let text = raw.trim().to_string();
            warn!(line, text = %text, "call parameters not cleanly delimited");
            self.warnings.push(MalformedLine { line, text });
        }

        match classified.kind {
            LineKind::OperatorOpen { name, params } => {
                let variant = self.operators.resolve(name, params, &self.hierarchy);
                debug!(line, depth = self.hierarchy.len(), %variant, "open {name}");
                let node = self.tree.push_child(
                    self.cursor,
                    variant.clone(),
                    name,
                    NodeCategory::Operator,
                    params,
                    line,
                );
                self.hierarchy.push(variant);
                self.cursor = node;
            }
            LineKind::InstanceLeaf { name, params } => {
                let variant = self.instances.resolve(name, params, &self.hierarchy);
                debug!(line, depth = self.hierarchy.len(), %variant, "instance {name}");
                self.tree.push_child(
                    self.cursor,
                    variant,
                    name,
                    NodeCategory::Instance,
                    params,
                    line,
                );
            }
            LineKind::BlockClose => {
                let parent = self.tree.parent(self.cursor);
                let (Some(variant), Some(parent)) = (self.hierarchy.pop(), parent) else {
                    return Err(CsgError::UnbalancedClose { line });
                };
                debug!(line, depth = self.hierarchy.len(), %variant, "close");
                self.cursor = parent;
            }
            LineKind::Other => {
                trace!(line, "skip");
            }
        }
        Ok(())
    }

    /// Finish the pass and hand out the result.
    ///
    /// Fails with [`CsgError::UnclosedBlocks`] if any block is still open.
    pub fn finish(self) -> Result<ParsedCsg> {
        if !self.hierarchy.is_empty() {
            return Err(CsgError::UnclosedBlocks {
                open: self.hierarchy,
            });
        }
        debug_assert_eq!(self.cursor, self.tree.root());

        info!(
            lines = self.line,
            nodes = self.tree.len() - 1,
            operator_variants = self.operators.len(),
            instance_variants = self.instances.len(),
            warnings = self.warnings.len(),
            "parsed CSG"
        );

        Ok(ParsedCsg {
            tree: self.tree,
            operators: self.operators,
            instances: self.instances,
            warnings: self.warnings,
        })
    }
}

/// Parse a sequence of lines.
pub fn parse_lines<I, S>(lines: I) -> Result<ParsedCsg>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let span = info_span!("csgtree.parse");
    let _enter = span.enter();

    let mut builder = TreeBuilder::new();
    for line in lines {
        builder.feed_line(line.as_ref())?;
    }
    builder.finish()
}

/// Parse CSG text held in memory.
pub fn parse_str(text: &str) -> Result<ParsedCsg> {
    parse_lines(text.lines())
}

/// Read a CSG file fully, then parse it.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedCsg> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| CsgError::read(path, e))?;
    debug!(path = %path.display(), bytes = text.len(), "loaded CSG file");
    parse_str(&text)
}
