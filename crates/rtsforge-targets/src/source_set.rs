//! Source sets and their entries.
//!
//! A source set groups the files fulfilling one build role (e.g. `crt0` for
//! startup code). Entries keep declaration order: link order can matter.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One file reference inside a [`SourceSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceEntry {
    /// A file used under its own name.
    Plain(String),
    /// `replacement` is used wherever an ancestor declared `default`.
    Override { default: String, replacement: String },
}

impl SourceEntry {
    /// The file that actually gets compiled.
    pub fn file(&self) -> &str {
        match self {
            SourceEntry::Plain(path) => path,
            SourceEntry::Override { replacement, .. } => replacement,
        }
    }

    /// The name the file is installed under in the generated runtime.
    pub fn install_name(&self) -> &str {
        match self {
            SourceEntry::Plain(path) => path,
            SourceEntry::Override { default, .. } => default,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, SourceEntry::Override { .. })
    }
}

// Plain entries serialize as a bare string and overrides as a one-key table,
// matching the shape accepted by the `.target.toml` loader.
impl Serialize for SourceEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceEntry::Plain(path) => serializer.serialize_str(path),
            SourceEntry::Override {
                default,
                replacement,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(default, replacement)?;
                map.end()
            }
        }
    }
}

/// Input shape accepted by `TargetDescriptor::add_sources`.
///
/// A bare path, or a mapping of `default -> replacement` pairs. Each pair of
/// a mapping becomes its own [`SourceEntry::Override`], in mapping order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Path(String),
    Overrides(Vec<(String, String)>),
}

impl SourceSpec {
    /// Convenience constructor for a single override pair.
    pub fn replace(default: impl Into<String>, replacement: impl Into<String>) -> Self {
        SourceSpec::Overrides(vec![(default.into(), replacement.into())])
    }

    /// Build an override mapping from any iterator of pairs.
    pub fn overrides<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SourceSpec::Overrides(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for SourceSpec {
    fn from(path: &str) -> Self {
        SourceSpec::Path(path.to_string())
    }
}

impl From<String> for SourceSpec {
    fn from(path: String) -> Self {
        SourceSpec::Path(path)
    }
}

/// A named, ordered group of source entries.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SourceSet {
    name: String,
    entries: Vec<SourceEntry>,
}

impl SourceSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// Files that get compiled, in order.
    pub fn files(&self) -> Vec<&str> {
        self.entries.iter().map(SourceEntry::file).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn push(&mut self, entry: SourceEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<SourceEntry> {
        &mut self.entries
    }
}
