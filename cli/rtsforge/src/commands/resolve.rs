//! `rtsforge resolve` — print the flattened build recipe for a target.

use std::fmt::{self, Write as _};

use anyhow::{bail, Result};

use rtsforge_targets::{ResolvedRecipe, SourceEntry, TargetRegistry};

pub fn run(registry: &TargetRegistry, name: &str, format: Option<&str>) -> Result<()> {
    let recipe = registry.resolve(name)?;
    let rendered = match format.unwrap_or("human") {
        "human" => render_human(&recipe)?,
        "toml" => recipe.to_toml()?,
        "json" => recipe.to_json()?,
        other => bail!("unknown format '{other}' (expected human, toml, or json)"),
    };
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn render_human(recipe: &ResolvedRecipe) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== Recipe: {} ===", recipe.target_name)?;
    writeln!(out, "Chain:    {}", recipe.chain.join(" -> "))?;
    if let Some(triplet) = &recipe.triplet {
        writeln!(out, "Triplet:  {triplet}")?;
    }
    if !recipe.loaders.is_empty() {
        writeln!(out, "Loaders:  {}", recipe.loaders.join(", "))?;
    }
    writeln!(out, "Switches: {}", recipe.switches.join(" "))?;
    out.push('\n');

    out.push_str("--- Linker scripts ---\n");
    for script in &recipe.linker_scripts {
        let loader = script.loader.as_deref().unwrap_or("default");
        writeln!(out, "  {} [{loader}]", script.path)?;
    }
    for set in &recipe.source_sets {
        writeln!(out, "--- Sources: {} ({} files) ---", set.name(), set.len())?;
        for entry in set.entries() {
            match entry {
                SourceEntry::Plain(path) => writeln!(out, "  {path}")?,
                SourceEntry::Override {
                    default,
                    replacement,
                } => writeln!(out, "  {replacement} (as {default})")?,
            }
        }
    }
    Ok(out)
}
