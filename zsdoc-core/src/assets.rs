use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset directory not found: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("Failed to walk asset directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to copy {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Copies the contents of `source` into `destination`, keeping the directory
/// layout. Existing files are overwritten. Returns the number of files copied.
pub fn copy_dir(source: &Path, destination: &Path) -> Result<usize, AssetError> {
    if !source.is_dir() {
        return Err(AssetError::MissingSource(source.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .unwrap_or(entry.path());
        let target = destination.join(relative);
        let io_error = |source| AssetError::Copy {
            path: entry.path().to_path_buf(),
            source,
        };

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(io_error)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(io_error)?;
            tracing::trace!(path = %relative.display(), "Copied asset");
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_nested_tree() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(source.path().join("js")).unwrap();
        std::fs::write(source.path().join("style.css"), "body {}").unwrap();
        std::fs::write(source.path().join("js/app.js"), "init();").unwrap();

        let copied = copy_dir(source.path(), destination.path()).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            std::fs::read_to_string(destination.path().join("js/app.js")).unwrap(),
            "init();"
        );
        assert!(destination.path().join("style.css").is_file());
    }

    #[test]
    fn test_overwrites_existing_files() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        std::fs::write(source.path().join("a.txt"), "new").unwrap();
        std::fs::write(destination.path().join("a.txt"), "old").unwrap();

        copy_dir(source.path(), destination.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(destination.path().join("a.txt")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_missing_source() {
        let destination = tempfile::tempdir().unwrap();
        let missing = destination.path().join("nope");

        assert!(matches!(
            copy_dir(&missing, destination.path()),
            Err(AssetError::MissingSource(_))
        ));
    }
}
