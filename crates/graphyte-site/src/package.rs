//! Zip packaging of a built site.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Error packaging a directory.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

/// Archive every file under `src` into `dest`.
///
/// Entry names are relative to `src` and use `/` separators. Entries are
/// added in sorted order so the same tree always yields the same listing.
///
/// # Errors
///
/// Returns [`PackageError`] if `src` cannot be walked or `dest` cannot be
/// written.
pub fn zip_dir(src: &Path, dest: &Path) -> Result<PathBuf, PackageError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| PackageError::Io { path, source }
    };
    let zip_err = |source| PackageError::Zip {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let file = File::create(dest).map_err(io_err(dest))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0usize;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|source| PackageError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        // The archive may live inside the tree being packed.
        if path == dest {
            continue;
        }
        let Ok(relative) = path.strip_prefix(src) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options).map_err(zip_err)?;
        } else {
            zip.start_file(name, options).map_err(zip_err)?;
            let data = std::fs::read(path).map_err(io_err(path))?;
            zip.write_all(&data).map_err(io_err(dest))?;
            count += 1;
        }
    }

    let mut writer = zip.finish().map_err(zip_err)?;
    writer.flush().map_err(io_err(dest))?;
    info!(archive = %dest.display(), files = count, "Archive written");
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_zip_dir_contents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("out");
        std::fs::create_dir_all(src.join("sub")).unwrap();
        std::fs::write(src.join("index.html"), "<html></html>").unwrap();
        std::fs::write(src.join("sub/a.txt"), "alpha").unwrap();

        let dest = dir.path().join("zip/site.zip");
        zip_dir(&src, &dest).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_owned).collect();
        names.sort();
        assert_eq!(names, vec!["index.html", "sub/", "sub/a.txt"]);

        let mut content = String::new();
        archive
            .by_name("sub/a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "alpha");
    }

    #[test]
    fn test_zip_skips_itself() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        let dest = dir.path().join("self.zip");
        zip_dir(dir.path(), &dest).unwrap();

        let archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_zip_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = zip_dir(&dir.path().join("nope"), &dir.path().join("x.zip")).unwrap_err();
        assert!(matches!(err, PackageError::Walk { .. }));
    }
}
