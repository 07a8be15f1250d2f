//! TOML loading, serialization, and discovery for descriptor files.
//!
//! Descriptors live in `<name>.target.toml` files. A file mirrors the
//! construction operations of [`TargetDescriptor`]:
//!
//! ```toml
//! name = "p5634"
//! parent = "ppc-spe"
//! compiler-switches = ["-mfloat-gprs=single"]
//!
//! [[linker-scripts]]
//! path = "powerpc/mpc5634/5634.ld"
//!
//! [source-sets]
//! crt0 = [
//!     "powerpc/mpc5634/start.S",
//!     { "s-macres.adb" = "s-macres-p55.adb", "s-textio.adb" = "s-textio-p55.adb" },
//! ]
//! ```
//!
//! Registration stays explicit: [`load_dir`] is a caller-side helper that
//! hands every parsed file to [`TargetRegistry::register`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::descriptor::TargetDescriptor;
use crate::error::{Result, TargetError};
use crate::registry::TargetRegistry;
use crate::source_set::{SourceEntry, SourceSpec};

/// File extension of descriptor files.
pub const TARGET_FILE_SUFFIX: &str = ".target.toml";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DescriptorFile {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    triplet: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    loaders: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    compiler_switches: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    linker_scripts: Vec<LinkerScriptFile>,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    source_sets: toml::Table,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinkerScriptFile {
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loader: Option<String>,
}

/// Parse a descriptor from a TOML string.
pub fn parse_descriptor_toml(toml_str: &str) -> Result<TargetDescriptor> {
    let file: DescriptorFile = toml::from_str(toml_str)?;
    if file.name.is_empty() {
        return Err(TargetError::config("<unnamed>", "descriptor name is empty"));
    }

    let mut descriptor = TargetDescriptor::new(&file.name);
    if let Some(parent) = file.parent {
        descriptor = descriptor.with_parent(parent);
    }
    if let Some(description) = file.description {
        descriptor = descriptor.with_description(description);
    }
    if let Some(triplet) = file.triplet {
        descriptor = descriptor.with_triplet(triplet);
    }
    for loader in file.loaders {
        descriptor.add_loader(loader)?;
    }
    descriptor.add_compiler_switches(file.compiler_switches);
    for script in file.linker_scripts {
        descriptor.add_linker_script(script.path, script.loader.as_deref())?;
    }
    for (set_name, value) in &file.source_sets {
        let Value::Array(items) = value else {
            return Err(TargetError::config(
                &file.name,
                format!(
                    "source set '{set_name}' must be an array, found {}",
                    value.type_str()
                ),
            ));
        };
        let specs = items
            .iter()
            .map(|item| source_spec(&file.name, set_name, item))
            .collect::<Result<Vec<_>>>()?;
        descriptor.add_sources(set_name, specs)?;
    }

    Ok(descriptor)
}

fn source_spec(target: &str, set_name: &str, value: &Value) -> Result<SourceSpec> {
    match value {
        Value::String(path) => Ok(SourceSpec::Path(path.clone())),
        Value::Table(table) => table
            .iter()
            .map(|(default, replacement)| match replacement {
                Value::String(replacement) => Ok((default.clone(), replacement.clone())),
                other => Err(TargetError::config(
                    target,
                    format!(
                        "override for '{default}' in set '{set_name}' must be a path, found {}",
                        other.type_str()
                    ),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(SourceSpec::Overrides),
        other => Err(TargetError::config(
            target,
            format!(
                "entry in set '{set_name}' must be a path or a table of overrides, found {}",
                other.type_str()
            ),
        )),
    }
}

/// Load a descriptor from a `.target.toml` file.
pub fn load_descriptor_toml(path: &Path) -> Result<TargetDescriptor> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_descriptor_toml(&content)
}

/// Serialize a descriptor, as declared, to pretty TOML.
pub fn descriptor_to_toml(descriptor: &TargetDescriptor) -> Result<String> {
    let mut source_sets = toml::Table::new();
    for set in descriptor.source_sets() {
        let items = set
            .entries()
            .iter()
            .map(|entry| match entry {
                SourceEntry::Plain(path) => Value::String(path.clone()),
                SourceEntry::Override {
                    default,
                    replacement,
                } => {
                    let mut table = toml::Table::new();
                    table.insert(default.clone(), Value::String(replacement.clone()));
                    Value::Table(table)
                }
            })
            .collect();
        source_sets.insert(set.name().to_string(), Value::Array(items));
    }

    let file = DescriptorFile {
        name: descriptor.name().to_string(),
        parent: descriptor.parent().map(str::to_string),
        description: descriptor.description().map(str::to_string),
        triplet: descriptor.triplet().map(str::to_string),
        loaders: descriptor.loaders().to_vec(),
        compiler_switches: descriptor.compiler_switches().to_vec(),
        linker_scripts: descriptor
            .linker_scripts()
            .iter()
            .map(|s| LinkerScriptFile {
                path: s.path.clone(),
                loader: s.loader.clone(),
            })
            .collect(),
        source_sets,
    };
    Ok(toml::to_string_pretty(&file)?)
}

/// Generate a template `.target.toml` for a new board descriptor.
pub fn generate_template(name: &str, parent: Option<&str>) -> Result<String> {
    let mut descriptor = TargetDescriptor::new(name)
        .with_description(format!("{name} board support"));
    if let Some(parent) = parent {
        descriptor = descriptor.with_parent(parent);
    }
    descriptor.add_linker_script(format!("{name}/{name}.ld"), None)?;
    descriptor.add_sources("crt0", [format!("{name}/start.S")])?;
    descriptor_to_toml(&descriptor)
}

/// Discover all `.target.toml` files directly inside `dir`.
///
/// Returns (file stem, path) pairs sorted by stem. A missing directory
/// yields an empty list.
pub fn discover_targets(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut targets = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(TARGET_FILE_SUFFIX))
            .map(str::to_string);
        if let Some(stem) = stem {
            targets.push((stem, path));
        }
    }
    targets.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(targets)
}

/// Parse and register every descriptor file in `dir`.
///
/// Returns the registered names. Stops at the first failure; descriptors
/// registered before it stay registered.
pub fn load_dir(registry: &mut TargetRegistry, dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for (stem, path) in discover_targets(dir)? {
        let descriptor = load_descriptor_toml(&path)?;
        if descriptor.name() != stem {
            tracing::warn!(
                file = %path.display(),
                target_name = descriptor.name(),
                "descriptor name does not match its file name"
            );
        }
        names.push(descriptor.name().to_string());
        registry.register(descriptor)?;
    }
    tracing::debug!(dir = %dir.display(), count = names.len(), "loaded target descriptors");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    const P5634_TOML: &str = r#"
name = "p5634"
parent = "ppc-spe"
compiler-switches = ["-mfloat-gprs=single"]

[[linker-scripts]]
path = "powerpc/mpc5634/5634.ld"

[source-sets]
crt0 = [
    "powerpc/mpc5634/start.S",
    { "s-macres.adb" = "s-macres-p55.adb", "s-textio.adb" = "s-textio-p55.adb" },
]
"#;

    #[test]
    fn parse_p5634() {
        let d = parse_descriptor_toml(P5634_TOML).unwrap();
        assert_eq!(d.name(), "p5634");
        assert_eq!(d.parent(), Some("ppc-spe"));
        assert_eq!(d.compiler_switches(), ["-mfloat-gprs=single"]);
        assert_eq!(d.linker_scripts()[0].loader, None);
        assert_eq!(
            d.source_set("crt0").unwrap().files(),
            [
                "powerpc/mpc5634/start.S",
                "s-macres-p55.adb",
                "s-textio-p55.adb"
            ]
        );
    }

    #[test]
    fn round_trip_builtins() {
        let registry = builtin::builtin_registry().unwrap();
        for original in registry.descriptors() {
            let toml_str = descriptor_to_toml(original).unwrap();
            let parsed = parse_descriptor_toml(&toml_str).unwrap();
            assert_eq!(**original, parsed);
        }
    }

    #[test]
    fn parse_minimal() {
        let d = parse_descriptor_toml("name = \"bare\"").unwrap();
        assert_eq!(d.name(), "bare");
        assert!(d.parent().is_none());
        assert!(d.source_sets().is_empty());
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(parse_descriptor_toml("this is not valid toml [[[").is_err());
        assert!(parse_descriptor_toml("parent = \"x\"").is_err());
        assert!(parse_descriptor_toml("name = \"x\"\nbogus = 1").is_err());
    }

    #[test]
    fn malformed_source_entry_is_configuration_error() {
        let err = parse_descriptor_toml("name = \"x\"\n[source-sets]\ncrt0 = [\"a.S\", 42]")
            .unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));

        let err = parse_descriptor_toml("name = \"x\"\n[source-sets]\ncrt0 = [{ \"a.adb\" = 1 }]")
            .unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));

        let err = parse_descriptor_toml("name = \"x\"\n[source-sets]\ncrt0 = [{}]").unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));

        let err = parse_descriptor_toml("name = \"x\"\n[source-sets]\ncrt0 = \"a.S\"").unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));
    }

    #[test]
    fn empty_linker_script_path_is_configuration_error() {
        let err = parse_descriptor_toml("name = \"x\"\n[[linker-scripts]]\npath = \"\"").unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));
    }

    #[test]
    fn template_parses() {
        let toml_str = generate_template("myboard", Some("ppc-spe")).unwrap();
        let d = parse_descriptor_toml(&toml_str).unwrap();
        assert_eq!(d.name(), "myboard");
        assert_eq!(d.parent(), Some("ppc-spe"));
        assert_eq!(d.linker_scripts()[0].path, "myboard/myboard.ld");
    }

    #[test]
    fn discover_targets_finds_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("board-b.target.toml"), "name = \"board-b\"").unwrap();
        std::fs::write(dir.path().join("board-a.target.toml"), "name = \"board-a\"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let targets = discover_targets(dir.path()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].0, "board-a");
        assert_eq!(targets[1].0, "board-b");
    }

    #[test]
    fn discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_targets(&dir.path().join("targets")).unwrap().is_empty());
    }

    #[test]
    fn load_not_found() {
        let result = load_descriptor_toml(Path::new("/nonexistent/x.target.toml"));
        assert!(matches!(result.unwrap_err(), TargetError::NotFound { .. }));
    }

    #[test]
    fn load_dir_registers_and_resolves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p5634.target.toml"), P5634_TOML).unwrap();

        let mut registry = builtin::builtin_registry().unwrap();
        let err = load_dir(&mut registry, dir.path()).unwrap_err();
        assert!(matches!(err, TargetError::DuplicateTarget { .. }));

        let mut registry = TargetRegistry::new();
        registry.register(builtin::ppc_spe().unwrap()).unwrap();
        let names = load_dir(&mut registry, dir.path()).unwrap();
        assert_eq!(names, ["p5634"]);
        let recipe = registry.resolve("p5634").unwrap();
        assert_eq!(recipe.chain, ["ppc-spe", "p5634"]);
    }
}
