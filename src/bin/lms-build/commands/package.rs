//! `lms-build package` command

use anyhow::Result;

use crate::cli::PackageArgs;
use lms_build::builder::package::{debian_arch, PackageManifest};
use lms_build::core::Project;

pub fn execute(args: PackageArgs) -> Result<()> {
    let project = Project::discover(&args.source_dir)?;
    let manifest = PackageManifest::from_project(&project);

    let arch = args
        .arch
        .unwrap_or_else(|| debian_arch(std::env::consts::ARCH).to_string());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    if args.control {
        print!("{}", manifest.render_control(&arch));
        return Ok(());
    }

    println!("{} {}", manifest.name, manifest.version);
    println!("  generator: {}", manifest.generator.as_str());
    println!("  contact:   {}", manifest.contact);
    println!("  archive:   {}", manifest.archive_name(&arch));
    println!();
    print!("{}", manifest.render_config());

    Ok(())
}
