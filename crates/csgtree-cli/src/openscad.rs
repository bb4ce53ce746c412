//! Running the OpenSCAD compiler to produce CSG text.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::{debug, info};

/// Application bundle location on macOS.
const MACOS_BUNDLE: &str = "/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD";

/// Executable name searched on `PATH`.
const EXECUTABLE: &str = if cfg!(windows) { "openscad.exe" } else { "openscad" };

/// Errors from preparing or running the compiler.
#[derive(Error, Debug)]
pub enum CompileError {
    /// No usable OpenSCAD executable.
    #[error("OpenSCAD executable not found: {0}")]
    NotFound(String),

    /// The process could not be started.
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        /// Executable that was run.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran and reported failure.
    #[error("OpenSCAD failed ({status}): {stderr}")]
    Failed {
        /// Exit status.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The working directory could not be created.
    #[error("failed to create working directory {}: {source}", path.display())]
    Workdir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Locate the OpenSCAD executable.
///
/// An explicit path wins; otherwise the macOS bundle (on macOS) and then
/// every directory of `PATH` are tried.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, CompileError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(CompileError::NotFound(path.display().to_string()))
        };
    }

    if cfg!(target_os = "macos") {
        let bundle = Path::new(MACOS_BUNDLE);
        if bundle.is_file() {
            return Ok(bundle.to_path_buf());
        }
    }

    let search = std::env::var_os("PATH").unwrap_or_default();
    find_in_path(EXECUTABLE, &search)
        .ok_or_else(|| CompileError::NotFound(format!("{EXECUTABLE} is not on PATH")))
}

/// First `dir/name` that is a file, over the directories of a `PATH`-style list.
fn find_in_path(name: &str, search: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Create `dir` and its parents if they do not exist.
pub fn prepare_workdir(dir: &Path) -> Result<(), CompileError> {
    if dir.is_dir() {
        return Ok(());
    }
    debug!(path = %dir.display(), "creating working directory");
    std::fs::create_dir_all(dir).map_err(|source| CompileError::Workdir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Run `openscad -o <output> <source>` and wait for it.
///
/// Not retried on failure.
pub fn compile(openscad: &Path, source: &Path, output: &Path) -> Result<(), CompileError> {
    info!(
        source = %source.display(),
        output = %output.display(),
        "compiling with {}",
        openscad.display()
    );

    let result = Command::new(openscad)
        .arg("-o")
        .arg(output)
        .arg(source)
        .output()
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => {
                CompileError::NotFound(openscad.display().to_string())
            }
            _ => CompileError::Spawn {
                program: openscad.to_path_buf(),
                source: err,
            },
        })?;

    if !result.status.success() {
        return Err(CompileError::Failed {
            status: result.status,
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }
    debug!(status = %result.status, "OpenSCAD finished");
    Ok(())
}
