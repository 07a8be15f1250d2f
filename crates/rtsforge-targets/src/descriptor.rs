//! Target descriptors.
//!
//! A descriptor is the declarative unit describing how to build for one
//! hardware variant. It may specialize a parent descriptor by name; the
//! resolver flattens the chain into a [`crate::ResolvedRecipe`].

use serde::Serialize;

use crate::error::{Result, TargetError};
use crate::source_set::{SourceEntry, SourceSet, SourceSpec};

/// A linker script and the loader it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkerScript {
    /// Logical path (e.g. `powerpc/mpc5634/5634.ld`).
    pub path: String,
    /// `None` means the default loader region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
}

/// Declarative build parameters for one target.
///
/// Mutated only while it is being built; once handed to a
/// [`crate::TargetRegistry`] it is shared behind an `Arc` and read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    name: String,
    parent: Option<String>,
    description: Option<String>,
    triplet: Option<String>,
    loaders: Vec<String>,
    compiler_switches: Vec<String>,
    linker_scripts: Vec<LinkerScript>,
    source_sets: Vec<SourceSet>,
}

impl TargetDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            description: None,
            triplet: None,
            loaders: Vec::new(),
            compiler_switches: Vec::new(),
            linker_scripts: Vec::new(),
            source_sets: Vec::new(),
        }
    }

    /// Specialize the descriptor registered under `parent`.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the toolchain triplet (e.g. `powerpc-elf`).
    pub fn with_triplet(mut self, triplet: impl Into<String>) -> Self {
        self.triplet = Some(triplet.into());
        self
    }

    pub fn add_compiler_switch(&mut self, switch: impl Into<String>) -> &mut Self {
        self.compiler_switches.push(switch.into());
        self
    }

    pub fn add_compiler_switches<I, S>(&mut self, switches: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compiler_switches
            .extend(switches.into_iter().map(Into::into));
        self
    }

    /// Declare a loader (e.g. `ROM`, `RAM`) this target can be built for.
    pub fn add_loader(&mut self, loader: impl Into<String>) -> Result<&mut Self> {
        let loader = loader.into();
        if loader.is_empty() {
            return Err(TargetError::config(&self.name, "loader name is empty"));
        }
        if !self.loaders.contains(&loader) {
            self.loaders.push(loader);
        }
        Ok(self)
    }

    /// Append a linker script. `loader = None` selects the default loader region.
    pub fn add_linker_script(
        &mut self,
        path: impl Into<String>,
        loader: Option<&str>,
    ) -> Result<&mut Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(TargetError::config(&self.name, "linker script path is empty"));
        }
        if loader == Some("") {
            return Err(TargetError::config(
                &self.name,
                format!("linker script '{path}' has an empty loader name"),
            ));
        }
        self.linker_scripts.push(LinkerScript {
            path,
            loader: loader.map(str::to_string),
        });
        Ok(self)
    }

    /// Append entries to the source set `set_name`, creating it if absent.
    ///
    /// Every entry is checked before anything is appended, so a rejected call
    /// leaves the descriptor unchanged.
    pub fn add_sources<I, E>(&mut self, set_name: &str, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<SourceSpec>,
    {
        if set_name.is_empty() {
            return Err(TargetError::config(&self.name, "source set name is empty"));
        }

        let mut staged = Vec::new();
        for spec in entries {
            match spec.into() {
                SourceSpec::Path(path) => {
                    if path.is_empty() {
                        return Err(TargetError::config(
                            &self.name,
                            format!("empty source path in set '{set_name}'"),
                        ));
                    }
                    staged.push(SourceEntry::Plain(path));
                }
                SourceSpec::Overrides(pairs) => {
                    if pairs.is_empty() {
                        return Err(TargetError::config(
                            &self.name,
                            format!("empty override mapping in set '{set_name}'"),
                        ));
                    }
                    for (default, replacement) in pairs {
                        if default.is_empty() || replacement.is_empty() {
                            return Err(TargetError::config(
                                &self.name,
                                format!(
                                    "override '{default}' -> '{replacement}' in set '{set_name}' \
                                     has an empty side"
                                ),
                            ));
                        }
                        staged.push(SourceEntry::Override {
                            default,
                            replacement,
                        });
                    }
                }
            }
        }

        let index = match self.source_sets.iter().position(|s| s.name() == set_name) {
            Some(index) => index,
            None => {
                self.source_sets.push(SourceSet::new(set_name));
                self.source_sets.len() - 1
            }
        };
        for entry in staged {
            self.source_sets[index].push(entry);
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn triplet(&self) -> Option<&str> {
        self.triplet.as_deref()
    }

    pub fn loaders(&self) -> &[String] {
        &self.loaders
    }

    pub fn compiler_switches(&self) -> &[String] {
        &self.compiler_switches
    }

    pub fn linker_scripts(&self) -> &[LinkerScript] {
        &self.linker_scripts
    }

    pub fn source_sets(&self) -> &[SourceSet] {
        &self.source_sets
    }

    /// Look up one of this descriptor's own source sets.
    pub fn source_set(&self, name: &str) -> Option<&SourceSet> {
        self.source_sets.iter().find(|s| s.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_p5634_like_descriptor() {
        let mut d = TargetDescriptor::new("p5634").with_parent("ppc-spe");
        d.add_compiler_switch("-mfloat-gprs=single");
        d.add_linker_script("powerpc/mpc5634/5634.ld", None).unwrap();
        d.add_sources(
            "crt0",
            [
                SourceSpec::from("powerpc/mpc5634/start.S"),
                SourceSpec::overrides([
                    ("s-macres.adb", "s-macres-p55.adb"),
                    ("s-textio.adb", "s-textio-p55.adb"),
                ]),
            ],
        )
        .unwrap();

        assert_eq!(d.name(), "p5634");
        assert_eq!(d.parent(), Some("ppc-spe"));
        assert_eq!(d.compiler_switches(), ["-mfloat-gprs=single"]);
        assert_eq!(
            d.linker_scripts(),
            [LinkerScript {
                path: "powerpc/mpc5634/5634.ld".into(),
                loader: None,
            }]
        );
        let crt0 = d.source_set("crt0").unwrap();
        assert_eq!(crt0.len(), 3);
        assert!(crt0.entries()[1].is_override());
    }

    #[test]
    fn add_sources_appends_to_existing_set() {
        let mut d = TargetDescriptor::new("t");
        d.add_sources("gnat", ["a.adb"]).unwrap();
        d.add_sources("gnarl", ["x.adb"]).unwrap();
        d.add_sources("gnat", ["b.adb"]).unwrap();
        assert_eq!(d.source_sets().len(), 2);
        assert_eq!(d.source_set("gnat").unwrap().files(), vec!["a.adb", "b.adb"]);
    }

    #[test]
    fn empty_linker_script_path_rejected() {
        let mut d = TargetDescriptor::new("t");
        let err = d.add_linker_script("", None).unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));
        assert!(d.linker_scripts().is_empty());
    }

    #[test]
    fn empty_loader_name_rejected() {
        let mut d = TargetDescriptor::new("t");
        assert!(d.add_linker_script("a.ld", Some("")).is_err());
        assert!(d.add_loader("").is_err());
    }

    #[test]
    fn malformed_entries_rejected_atomically() {
        let mut d = TargetDescriptor::new("t");
        d.add_sources("crt0", ["start.S"]).unwrap();

        let err = d
            .add_sources(
                "crt0",
                [SourceSpec::from("ok.S"), SourceSpec::Overrides(Vec::new())],
            )
            .unwrap_err();
        assert!(matches!(err, TargetError::Configuration { .. }));
        assert!(d
            .add_sources("crt0", [SourceSpec::replace("a.adb", "")])
            .is_err());
        assert!(d.add_sources("crt0", [""]).is_err());

        assert_eq!(d.source_set("crt0").unwrap().files(), vec!["start.S"]);
    }

    #[test]
    fn loaders_deduplicated() {
        let mut d = TargetDescriptor::new("t");
        d.add_loader("ROM").unwrap();
        d.add_loader("RAM").unwrap();
        d.add_loader("ROM").unwrap();
        assert_eq!(d.loaders(), ["ROM", "RAM"]);
    }
}
