//! `lms-build init` command

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::InitArgs;
use lms_build::core::project::{generate_default_project_file, PROJECT_FILE};
use lms_build::util::fs::write_string;

pub fn execute(args: InitArgs) -> Result<()> {
    let dir = args.path.unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(PROJECT_FILE);

    if path.exists() && !args.force {
        bail!(
            "`{}` already exists\n\
             help: Pass `--force` to overwrite it",
            path.display()
        );
    }

    write_string(&path, &generate_default_project_file())?;
    println!("Created {}", path.display());

    Ok(())
}
