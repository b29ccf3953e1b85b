use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};

/// Extract the single entry named `entry_name` from the zip at `archive_path`
/// into `target_dir/entry_name`.
///
/// Entries are matched on their final path component, so
/// `pocketbase_0.22.0/pocketbase` matches `pocketbase`. The entry is written
/// to a `.partial` sibling first and renamed into place once complete, so the
/// canonical path never holds a half-written file.
pub fn extract_entry(archive_path: &Path, target_dir: &Path, entry_name: &str) -> Result<PathBuf> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| Error::fs("failed to open archive", archive_path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| Error::archive(archive_path, e))?;

    let index = find_entry(&mut archive, archive_path, entry_name)?;
    let mut entry = archive
        .by_index(index)
        .map_err(|e| Error::archive(archive_path, e))?;

    let out_path = target_dir.join(entry_name);
    let staged = target_dir.join(format!(".{entry_name}.partial"));

    if let Err(e) = stage_and_rename(&mut entry, &staged, &out_path) {
        let _ = std::fs::remove_file(&staged);
        return Err(e);
    }

    debug!("Extracted {} to {}", entry.name(), out_path.display());
    Ok(out_path)
}

fn stage_and_rename(entry: &mut impl io::Read, staged: &Path, out_path: &Path) -> Result<()> {
    let mut out = std::fs::File::create(staged)
        .map_err(|e| Error::fs("failed to create extracted file", staged, e))?;
    io::copy(entry, &mut out).map_err(|e| Error::fs("failed to extract archive entry", staged, e))?;
    out.sync_all()
        .map_err(|e| Error::fs("failed to flush extracted file", staged, e))?;
    drop(out);
    std::fs::rename(staged, out_path)
        .map_err(|e| Error::fs("failed to move extracted file into place", out_path, e))
}

fn find_entry<R: io::Read + io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    archive_path: &Path,
    entry_name: &str,
) -> Result<usize> {
    let mut found = None;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| Error::archive(archive_path, e))?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        if path.file_name().and_then(|n| n.to_str()) != Some(entry_name) {
            continue;
        }
        if found.is_some() {
            warn!(
                "{} holds more than one '{entry_name}', using the first",
                archive_path.display()
            );
            break;
        }
        found = Some(i);
    }

    found.ok_or_else(|| Error::EntryNotFound {
        entry: entry_name.to_owned(),
        archive: archive_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn extracts_prefixed_entry_under_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(
            &archive,
            &[
                ("CHANGELOG.md", "notes"),
                ("dist/", ""),
                ("dist/pocketbase", "\x7fELF binary"),
            ],
        );

        let out = extract_entry(&archive, dir.path(), "pocketbase").unwrap();

        assert_eq!(out, dir.path().join("pocketbase"));
        assert_eq!(std::fs::read(&out).unwrap(), b"\x7fELF binary");
        assert!(!dir.path().join(".pocketbase.partial").exists());
        assert!(!dir.path().join("CHANGELOG.md").exists());
    }

    #[test]
    fn missing_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("pocketbase.exe", "MZ")]);

        let err = extract_entry(&archive, dir.path(), "pocketbase").unwrap_err();

        assert!(
            matches!(&err, Error::EntryNotFound { entry, .. } if entry == "pocketbase"),
            "got {err}"
        );
        assert!(!dir.path().join("pocketbase").exists());
    }

    #[test]
    fn directory_with_matching_name_is_not_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("pocketbase/", ""), ("pocketbase/README", "x")]);

        let err = extract_entry(&archive, dir.path(), "pocketbase").unwrap_err();
        assert!(matches!(err, Error::EntryNotFound { .. }), "got {err}");
    }

    #[test]
    fn replaces_existing_binary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pocketbase"), b"old").unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("pocketbase", "new")]);

        extract_entry(&archive, dir.path(), "pocketbase").unwrap();

        assert_eq!(std::fs::read(dir.path().join("pocketbase")).unwrap(), b"new");
    }

    #[test]
    fn garbage_archive_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        std::fs::write(&archive, b"this is not a zip").unwrap();

        let err = extract_entry(&archive, dir.path(), "pocketbase").unwrap_err();
        assert!(matches!(err, Error::Archive { .. }), "got {err}");
    }
}
