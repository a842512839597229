//! `lms-build install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use lms_build::builder::DISABLED_MESSAGE;
use lms_build::ops::install::{install, InstallOptions, InstalledFileKind};

pub fn execute(args: InstallArgs) -> Result<()> {
    let mut opts = InstallOptions::new(&args.build_dir, &args.prefix).with_dry_run(args.dry_run);
    if let Some(ref source_dir) = args.source_dir {
        opts = opts.with_source_dir(source_dir);
    }

    let result = install(&opts)?;

    if result.files.is_empty() {
        println!("Nothing to install. {}", DISABLED_MESSAGE);
        return Ok(());
    }

    let verb = if args.dry_run {
        "Would install"
    } else {
        "Installing"
    };

    for file in &result.files {
        let kind = match file.kind {
            InstalledFileKind::Artifact => "artifact",
            InstalledFileKind::Header => "header",
            InstalledFileKind::Generated => "generated",
            InstalledFileKind::Targets => "targets",
        };
        println!("{} {} ({})", verb, file.destination.display(), kind);
    }

    println!(
        "{} {} files into {}",
        if args.dry_run { "Would install" } else { "Installed" },
        result.files.len(),
        args.prefix.display()
    );

    Ok(())
}
