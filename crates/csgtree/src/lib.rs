#![warn(missing_docs)]

//! Scene-graph reconstruction for OpenSCAD CSG output.
//!
//! Compiling a `.scad` file with `openscad -o model.csg` produces a flattened
//! text form made of nested operator blocks (`union() {`, `multmatrix(...) {`)
//! and leaf primitive statements (`cube(size = [1, 1, 1], center = false);`).
//! This crate reads that text in a single forward pass and rebuilds it as:
//!
//! - an arena-owned tree of [`Node`]s mirroring the block structure,
//! - two [`VariantRegistry`]s, one for operators and one for instances, which
//!   collapse calls with identical name and parameter text into one variant
//!   (`cube0`, `cube1`, ...), counting occurrences and, for instances, the
//!   hierarchy paths they appeared under.
//!
//! # Example
//!
//! ```
//! use csgtree::parse_str;
//!
//! let csg = "union() {\n  cube(size = 1);\n  cube(size = 1);\n}\n";
//! let parsed = parse_str(csg).unwrap();
//!
//! let cube = parsed.instances.get("cube", "size = 1").unwrap();
//! assert_eq!(cube.variant_id, "cube0");
//! assert_eq!(cube.count, 2);
//! assert_eq!(cube.paths, vec![vec!["union0".to_string()]; 2]);
//! ```

mod builder;
mod classify;
mod error;
mod registry;
mod tree;

pub use builder::{parse_file, parse_lines, parse_str, MalformedLine, ParsedCsg, TreeBuilder};
pub use classify::{classify, Classification, LineKind};
pub use error::{CsgError, Result};
pub use registry::{HierarchyPath, RegistryKind, VariantEntry, VariantRegistry};
pub use tree::{CsgTree, Node, NodeCategory, NodeId, Walk, ROOT_NAME};
