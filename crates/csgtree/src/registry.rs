//! Variant registries: deduplication of calls by name and parameter text.
//!
//! A registry maps each distinct `(name, params)` pair to a [`VariantEntry`]
//! whose id is the name followed by a per-name index assigned in first-seen
//! order (`cube0`, `cube1`, ...). Operators and instances use two separate
//! registries so the namespaces never collide.

use indexmap::IndexMap;
use serde::Serialize;

/// Enclosing operator variant ids, outermost first.
pub type HierarchyPath = Vec<String>;

/// Which calls a registry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Block-scoped operators (`union`, `multmatrix`, ...). Paths are not kept.
    Operator,
    /// Leaf instances (`cube`, `sphere`, ...). Every occurrence records its path.
    Instance,
}

/// One distinct `(name, params)` signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantEntry {
    /// `name` followed by `index`, e.g. `cube0`.
    pub variant_id: String,
    /// Operation or primitive name.
    pub name: String,
    /// Raw parameter text.
    pub params: String,
    /// Zero-based first-seen index among variants of `name`.
    pub index: usize,
    /// Number of occurrences.
    pub count: usize,
    /// Hierarchy path of each occurrence (instance registries only).
    pub paths: Vec<HierarchyPath>,
}

/// Registry of variants for one namespace.
#[derive(Debug, Clone, Serialize)]
pub struct VariantRegistry {
    kind: RegistryKind,
    /// name -> params -> entry, both levels in first-seen order.
    entries: IndexMap<String, IndexMap<String, VariantEntry>>,
}

impl VariantRegistry {
    /// Create an empty registry of the given kind.
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Create an empty operator registry.
    pub fn operators() -> Self {
        Self::new(RegistryKind::Operator)
    }

    /// Create an empty instance registry.
    pub fn instances() -> Self {
        Self::new(RegistryKind::Instance)
    }

    /// Which namespace this registry records.
    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Record one occurrence of `name(params)` and return its variant id.
    ///
    /// For instance registries `path` is copied into the entry, so later
    /// changes to the caller's hierarchy stack do not affect it.
    pub fn resolve(&mut self, name: &str, params: &str, path: &[String]) -> String {
        let track_paths = self.kind == RegistryKind::Instance;
        let variants = self.entries.entry(name.to_string()).or_default();
        let index = variants.len();

        let entry = variants
            .entry(params.to_string())
            .or_insert_with(|| VariantEntry {
                variant_id: format!("{name}{index}"),
                name: name.to_string(),
                params: params.to_string(),
                index,
                count: 0,
                paths: Vec::new(),
            });

        entry.count += 1;
        if track_paths {
            entry.paths.push(path.to_vec());
        }
        entry.variant_id.clone()
    }

    /// Look up the entry for an exact signature.
    pub fn get(&self, name: &str, params: &str) -> Option<&VariantEntry> {
        self.entries.get(name)?.get(params)
    }

    /// Look up an entry by variant id.
    ///
    /// Ids are not guaranteed unique when names end in digits (`cube1` index 0
    /// and `cube` index 10 both read `cube10`); the first match wins.
    pub fn find(&self, variant_id: &str) -> Option<&VariantEntry> {
        self.iter().find(|e| e.variant_id == variant_id)
    }

    /// Distinct names, in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Variants of `name`, in index order.
    pub fn variants(&self, name: &str) -> impl Iterator<Item = &VariantEntry> {
        self.entries.get(name).into_iter().flat_map(|v| v.values())
    }

    /// All entries, grouped by name in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantEntry> {
        self.entries.values().flat_map(|v| v.values())
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total occurrences across all signatures.
    pub fn total_occurrences(&self) -> usize {
        self.iter().map(|e| e.count).sum()
    }
}
