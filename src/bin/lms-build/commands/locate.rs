//! `lms-build locate` command

use anyhow::Result;

use crate::cli::LocateArgs;
use lms_build::ops::locate::{locate, LocateError, LocateOptions, PREFIX_PATH_ENV};
use lms_build::util::diagnostic::suggestions;

pub fn execute(args: LocateArgs) -> Result<()> {
    let mut opts = LocateOptions::new(&args.name);
    opts.version = args.version;
    opts.prefixes = args.prefix_path;
    if let Some(value) = std::env::var_os(PREFIX_PATH_ENV) {
        opts = opts.with_prefix_path(&value);
    }

    tracing::debug!("searching {} prefixes for {}", opts.prefixes.len(), opts.name);

    match locate(&opts) {
        Ok(found) => {
            let version = found.version.as_deref().unwrap_or("unknown version");
            println!("Found {} {}", opts.name, version);
            println!("  prefix: {}", found.prefix.display());
            println!("  config: {}", found.config_file.display());
            if let Some(policy) = found.compatibility {
                println!("  compatibility: {}", policy);
            }
            Ok(())
        }
        Err(e) => {
            let mut message = e.to_string();
            match e {
                LocateError::Incompatible { ref candidates, .. } => {
                    for (path, version) in candidates {
                        message.push_str(&format!("\n  = {} (version {})", path.display(), version));
                    }
                }
                _ => {
                    message.push('\n');
                    message.push_str(suggestions::PACKAGE_NOT_FOUND);
                }
            }
            anyhow::bail!(message)
        }
    }
}
