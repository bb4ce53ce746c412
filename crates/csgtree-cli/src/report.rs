//! Human-readable rendering of a parse result.

use std::fmt;

use csgtree::{NodeCategory, ParsedCsg, VariantRegistry};

/// Per-name, per-signature summary of both registries.
pub struct Summary<'a>(pub &'a ParsedCsg);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsed = self.0;
        writeln!(f, "Summary:")?;
        writeln!(
            f,
            "  {} operator(s) in {} variant(s), {} instance(s) in {} variant(s)",
            parsed.operators.total_occurrences(),
            parsed.operators.len(),
            parsed.instances.total_occurrences(),
            parsed.instances.len(),
        )?;
        write_registry(f, "operator", &parsed.operators)?;
        write_registry(f, "instance", &parsed.instances)?;

        if !parsed.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for warning in &parsed.warnings {
                writeln!(
                    f,
                    "  line {}: parameters not cleanly delimited: {}",
                    warning.line, warning.text
                )?;
            }
        }
        Ok(())
    }
}

fn write_registry(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    registry: &VariantRegistry,
) -> fmt::Result {
    for name in registry.names() {
        writeln!(f, "  {label} '{name}'")?;
        for entry in registry.variants(name) {
            writeln!(f, "    params ({})", entry.params)?;
            writeln!(f, "      variant = '{}'", entry.variant_id)?;
            writeln!(f, "      count = {}", entry.count)?;
            if !entry.paths.is_empty() {
                writeln!(f, "      paths:")?;
                for path in &entry.paths {
                    writeln!(f, "        [{}]", path.join(", "))?;
                }
            }
        }
    }
    Ok(())
}

/// Indented dump of the tree, two spaces per level.
pub struct TreeDump<'a>(pub &'a ParsedCsg);

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = &self.0.tree;
        for (depth, id) in tree.walk() {
            let node = &tree[id];
            let indent = "  ".repeat(depth);
            match &node.kind {
                Some(kind) => writeln!(f, "{indent}{} type:{kind}", node.display_name)?,
                None => writeln!(f, "{indent}{}", node.display_name)?,
            }
            if !node.raw_params.is_empty() {
                writeln!(f, "{indent}    params = {}", node.raw_params)?;
            }
            let empty_block = node.category == NodeCategory::Operator && node.children.is_empty();
            if empty_block && !node.is_root() {
                writeln!(f, "{indent}    (empty)")?;
            }
        }
        Ok(())
    }
}
