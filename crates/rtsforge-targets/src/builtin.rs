//! Built-in descriptor catalogue for the PowerPC SPE family.

use crate::descriptor::TargetDescriptor;
use crate::error::Result;
use crate::registry::TargetRegistry;
use crate::source_set::SourceSpec;

/// Family base for e500/e200 cores with the SPE unit.
pub fn ppc_spe() -> Result<TargetDescriptor> {
    let mut d = TargetDescriptor::new("ppc-spe")
        .with_description("PowerPC SPE family base (e500/e200 cores)")
        .with_triplet("powerpc-eabispe");
    d.add_compiler_switch("-mcpu=8548");
    d.add_sources(
        "crt0",
        [
            "powerpc/spe/handler.S",
            "s-macres.adb",
            "s-textio.adb",
        ],
    )?;
    d.add_sources("gnarl", ["powerpc/spe/context_switch.S"])?;
    Ok(d)
}

/// Freescale MPC5634M (e200z3, single-precision SPE).
pub fn p5634() -> Result<TargetDescriptor> {
    let mut d = TargetDescriptor::new("p5634")
        .with_parent("ppc-spe")
        .with_description("Freescale MPC5634M (e200z3)");
    d.add_compiler_switch("-mfloat-gprs=single");
    d.add_linker_script("powerpc/mpc5634/5634.ld", None)?;
    d.add_sources(
        "crt0",
        [
            SourceSpec::from("powerpc/mpc5634/start.S"),
            SourceSpec::overrides([
                ("s-macres.adb", "s-macres-p55.adb"),
                ("s-textio.adb", "s-textio-p55.adb"),
            ]),
        ],
    )?;
    Ok(d)
}

/// Freescale MPC5566 (e200z6), bootable from flash or RAM.
pub fn p5566() -> Result<TargetDescriptor> {
    let mut d = TargetDescriptor::new("p5566")
        .with_parent("ppc-spe")
        .with_description("Freescale MPC5566 (e200z6)");
    d.add_loader("FLASH")?;
    d.add_loader("RAM")?;
    d.add_compiler_switch("-mfloat-gprs=single");
    d.add_linker_script("powerpc/mpc5566/common.ld", None)?;
    d.add_linker_script("powerpc/mpc5566/flash.ld", Some("FLASH"))?;
    d.add_linker_script("powerpc/mpc5566/ram.ld", Some("RAM"))?;
    d.add_sources(
        "crt0",
        [
            SourceSpec::from("powerpc/mpc5566/start-flash.S"),
            SourceSpec::from("powerpc/mpc5566/start-ram.S"),
            SourceSpec::overrides([
                ("s-macres.adb", "s-macres-p55.adb"),
                ("s-textio.adb", "s-textio-p55.adb"),
            ]),
        ],
    )?;
    Ok(d)
}

/// Freescale P2020 (e500v2, double-precision SPE).
pub fn p2020() -> Result<TargetDescriptor> {
    let mut d = TargetDescriptor::new("p2020")
        .with_parent("ppc-spe")
        .with_description("Freescale P2020 (e500v2)");
    d.add_compiler_switch("-mfloat-gprs=double");
    d.add_linker_script("powerpc/p2020/p2020.ld", None)?;
    d.add_sources(
        "crt0",
        [
            SourceSpec::from("powerpc/p2020/start-ram.S"),
            SourceSpec::from("powerpc/p2020/setup.S"),
            SourceSpec::replace("s-textio.adb", "s-textio-p2020.adb"),
        ],
    )?;
    Ok(d)
}

/// Every built-in descriptor, family bases first.
pub fn builtin_targets() -> Result<Vec<TargetDescriptor>> {
    Ok(vec![ppc_spe()?, p5634()?, p5566()?, p2020()?])
}

/// A registry holding the built-in catalogue.
pub fn builtin_registry() -> Result<TargetRegistry> {
    let mut registry = TargetRegistry::new();
    for descriptor in builtin_targets()? {
        registry.register(descriptor)?;
    }
    Ok(registry)
}
