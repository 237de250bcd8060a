//! Init command implementation

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use playlint_core::CheckerConfig;
use tracing::info;

pub fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CheckerConfig::CONFIG_FILES[0]);

    let mut file = loop {
        match create_new_no_follow(&config_path) {
            Ok(file) => break file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "Config file already exists. Use --force to overwrite."
                    ));
                }
                // Removes a symlink itself, never its target.
                match std::fs::remove_file(&config_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_diagnostic(),
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    };

    file.write_all(CheckerConfig::template().as_bytes())
        .into_diagnostic()?;
    info!("Created {}", config_path.display());
    Ok(())
}

/// Creates `path`, failing if anything (including a dangling symlink)
/// already exists there.
fn create_new_no_follow(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }

    options.open(path)
}
