//! Project snapshot
//!
//! The source files handed to the assembler worker on each build. The session treats a project
//! as read only, a fresh snapshot is cloned into every build request.

use std::fs;
use std::path::Path;

use crate::error::{ShellError, ShellErrorKind};
use crate::Result;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: String,
    pub name: String,
    pub contents: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub main: String,
    pub files: Vec<SourceFile>,
}

/// On disk form of a project, source files are listed relative to the manifest.
#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
    main: String,
    files: Vec<String>,
}

impl Project {
    pub fn new(name: String, main: String, files: Vec<SourceFile>) -> Self {
        Project { name, main, files }
    }

    /// Load a project from a JSON manifest of the form
    /// `{"name":"quake","main":"starquake.asm","files":["starquake.asm","lib/sprites.asm"]}`
    pub fn from_manifest<P: AsRef<Path>>(path: P) -> Result<Project> {
        let path = path.as_ref();
        let manifest = fs::read_to_string(path).map_err(|e| {
            ShellError::new(
                ShellErrorKind::ProjectError,
                format!("Can't read project {}", path.display()),
                format!("Can't read project {}: {}", path.display(), e),
            )
        })?;
        let manifest: Manifest = serde_json::from_str(&manifest).map_err(|e| {
            ShellError::new(
                ShellErrorKind::ProjectError,
                format!("Badly formed project {}", path.display()),
                format!("Badly formed project {}: {}", path.display(), e),
            )
        })?;

        let Manifest {
            name,
            main,
            files: paths,
        } = manifest;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut files = Vec::with_capacity(paths.len());
        for file in paths {
            let file_path = dir.join(&file);
            let contents = fs::read_to_string(&file_path).map_err(|e| {
                ShellError::new(
                    ShellErrorKind::ProjectError,
                    format!("Can't read source file {}", file),
                    format!("Can't read source file {}: {}", file_path.display(), e),
                )
            })?;
            let file_name = Path::new(&file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            files.push(SourceFile {
                id: file,
                name: file_name,
                contents,
            });
        }

        if !files.iter().any(|f| f.id == main) {
            return Err(ShellError::new(
                ShellErrorKind::ProjectError,
                format!("Main file {} isn't part of the project", main),
                format!("Main file {} not found in files of {}", main, path.display()),
            ));
        }

        Ok(Project::new(name, main, files))
    }
}
