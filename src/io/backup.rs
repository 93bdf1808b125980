//! Local archive backup.
//!
//! Copies every `*.zip` found directly inside a source directory into a
//! destination directory and records what was copied in
//! `backup_manifest.json` (name, size and SHA-256 of each archive).

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::{ArchiveEntry, BackupManifest};
use crate::error::AppError;

/// File name of the manifest written into the destination.
pub const MANIFEST_NAME: &str = "backup_manifest.json";

/// Copy archives from `src` to `dest` and write the manifest.
pub fn backup_archives(src: &Path, dest: &Path) -> Result<BackupManifest, AppError> {
    if !src.is_dir() {
        return Err(AppError::new(
            2,
            format!("Archive source '{}' is not a directory.", src.display()),
        ));
    }
    fs::create_dir_all(dest)
        .map_err(|e| AppError::new(2, format!("Failed to create backup dir '{}': {e}", dest.display())))?;

    let archives = list_archives(src)?;
    let mut files = Vec::with_capacity(archives.len());

    for path in archives {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let target = dest.join(&name);
        let bytes = fs::copy(&path, &target).map_err(|e| {
            AppError::new(
                4,
                format!("Failed to copy '{}' -> '{}': {e}", path.display(), target.display()),
            )
        })?;
        let sha256 = sha256_file(&target)?;
        info!(src = %path.display(), dest = %target.display(), bytes, "copied archive");
        files.push(ArchiveEntry { name, bytes, sha256 });
    }

    let manifest = BackupManifest {
        timestamp: Utc::now(),
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        count: files.len(),
        files,
    };

    let manifest_path = dest.join(MANIFEST_NAME);
    let file = File::create(&manifest_path).map_err(|e| {
        AppError::new(4, format!("Failed to create manifest '{}': {e}", manifest_path.display()))
    })?;
    serde_json::to_writer_pretty(file, &manifest)
        .map_err(|e| AppError::new(4, format!("Failed to write manifest: {e}")))?;

    info!(count = manifest.count, manifest = %manifest_path.display(), "backup complete");
    Ok(manifest)
}

/// `*.zip` files directly inside `dir`, sorted by file name.
fn list_archives(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", dir.display())))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", dir.display())))?;
        let path = entry.path();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip && path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Hex SHA-256 of a file, streamed in 1 MiB chunks.
pub fn sha256_file(path: &Path) -> Result<String, AppError> {
    let mut file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open '{}': {e}", path.display())))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1 << 20];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| AppError::new(4, format!("Failed to read '{}': {e}", path.display())))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_only_zip_archives_and_writes_manifest() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let dest_dir = dest.path().join("nested");

        fs::write(src.path().join("b.zip"), b"second").unwrap();
        fs::write(src.path().join("a.zip"), b"first!").unwrap();
        fs::write(src.path().join("notes.txt"), b"skip me").unwrap();

        let manifest = backup_archives(src.path(), &dest_dir).unwrap();

        assert_eq!(manifest.count, 2);
        let names: Vec<&str> = manifest.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.zip", "b.zip"]);
        assert_eq!(manifest.files[0].bytes, 6);
        assert!(dest_dir.join("a.zip").is_file());
        assert!(!dest_dir.join("notes.txt").exists());

        let text = fs::read_to_string(dest_dir.join(MANIFEST_NAME)).unwrap();
        let back: BackupManifest = serde_json::from_str(&text).unwrap();
        assert_eq!(back.files, manifest.files);
    }

    #[test]
    fn sha256_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.zip");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn missing_source_is_an_input_error() {
        let dest = tempfile::tempdir().unwrap();
        let err = backup_archives(Path::new("/definitely/not/here"), dest.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
