//! Filesystem staging
//!
//! Prepares the output tree and assembles build inputs: wiping the previous
//! run, creating the per-format directories, concatenating chapter sources
//! into the merged manuscript, and copying supporting assets.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use walkdir::WalkDir;

use super::project::Project;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Missing required input: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("No chapter files with extension '.{extension}' under {}", .dir.display())]
    NoChapters { dir: PathBuf, extension: String },

    #[error("Failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StagingError {
    fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Recursively removes the output tree. A missing tree is not an error, so
/// clobbering twice in a row is safe.
pub fn clobber(project: &Project) -> Result<(), StagingError> {
    let output = project.output_dir();

    match fs::remove_dir_all(&output) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StagingError::io("remove", output, e)),
    }
}

/// Creates one subdirectory per output format. Existing directories are
/// left alone, so repeated invocation is a no-op.
pub fn make_directories(project: &Project) -> Result<(), StagingError> {
    for dir in project.format_dirs() {
        fs::create_dir_all(&dir).map_err(|e| StagingError::io("create", dir, e))?;
    }
    Ok(())
}

/// Returns every chapter source under the content dir, sorted
/// lexicographically by path.
///
/// The sort fixes the concatenation order: the same input set always merges
/// to byte-identical output, independent of filesystem traversal order.
pub fn chapter_files(project: &Project) -> Result<Vec<PathBuf>, StagingError> {
    let content_dir = project.content_dir();

    if !content_dir.is_dir() {
        return Err(StagingError::MissingAsset(content_dir));
    }

    let extension = project.chapter_extension();
    let mut files = Vec::new();

    for entry in WalkDir::new(&content_dir).into_iter() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(PathBuf::from)
                .unwrap_or_else(|| content_dir.clone());
            StagingError::io("scan", path, e.into())
        })?;

        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
        {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(StagingError::NoChapters {
            dir: content_dir,
            extension: extension.to_string(),
        });
    }

    files.sort();
    Ok(files)
}

/// Concatenates every chapter source into the merged manuscript.
///
/// Chapter content is written verbatim; a newline is appended to any chapter
/// that does not end in one, so chapter boundaries never run together.
pub fn merge(project: &Project) -> Result<(), StagingError> {
    let chapters = chapter_files(project)?;

    let mut merged = String::new();
    for chapter in &chapters {
        let content = fs::read_to_string(chapter)
            .map_err(|e| StagingError::io("read", chapter.clone(), e))?;

        merged.push_str(&content);
        if !merged.ends_with('\n') {
            merged.push('\n');
        }
    }

    let target = project.merged_path();
    fs::write(&target, merged).map_err(|e| StagingError::io("write", target, e))
}

/// Copies the stylesheet, image files, and typesetting preamble into their
/// staging destinations. Any missing source fails the whole task; a partial
/// output tree is never produced silently.
pub fn copy_assets(project: &Project) -> Result<(), StagingError> {
    let stylesheet = project.stylesheet();
    if !stylesheet.is_file() {
        return Err(StagingError::MissingAsset(stylesheet));
    }
    copy_file(&stylesheet, &project.staged_stylesheet())?;

    let images_dir = project.images_dir();
    if !images_dir.is_dir() {
        return Err(StagingError::MissingAsset(images_dir));
    }

    let staged_images = project.staged_images_dir();
    fs::create_dir_all(&staged_images)
        .map_err(|e| StagingError::io("create", staged_images.clone(), e))?;

    let entries =
        fs::read_dir(&images_dir).map_err(|e| StagingError::io("read", images_dir.clone(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StagingError::io("read", images_dir.clone(), e))?;
        let path = entry.path();

        if path.is_file() {
            let name = entry.file_name();
            copy_file(&path, &staged_images.join(name))?;
        }
    }

    let preamble = project.preamble();
    if !preamble.is_file() {
        return Err(StagingError::MissingAsset(preamble));
    }
    let preamble_name = preamble
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("preamble.tex"));
    copy_file(&preamble, &project.tex_dir().join(preamble_name))
}

fn copy_file(from: &PathBuf, to: &PathBuf) -> Result<(), StagingError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| StagingError::io("copy", to.clone(), e))
}
