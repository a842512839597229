//! `lms-build flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use crate::commands::plan_for;
use lms_build::builder::usage::UsageResolver;

pub fn execute(args: FlagsArgs) -> Result<()> {
    let plan = plan_for(&args.project)?;

    let resolver = UsageResolver::new(&plan.graph);
    let compile = resolver.effective_compile(&args.target)?;

    println!("# Compile flags for `{}`:", args.target);

    // Features collapse to the highest requested standard.
    if let Some(item) = compile.features.iter().max_by_key(|f| f.value.standard()) {
        println!(
            "  -std={}    # from: {} [{}]",
            item.value.standard().as_flag_value(),
            item.provenance,
            item.value
        );
    }

    for item in &compile.include_dirs {
        println!(
            "  -I{}    # from: {}",
            item.value.display(),
            item.provenance
        );
    }

    for item in &compile.defines {
        println!("  {}    # from: {}", item.value.to_flag(), item.provenance);
    }

    if !compile.imported.is_empty() {
        println!();
        println!("# Imported targets (resolved by the external build):");
        for name in &compile.imported {
            println!("  {}", name);
        }
    }

    Ok(())
}
