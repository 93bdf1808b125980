//! Zip packaging of a whole project tree.
//!
//! Every regular file below `src` is stored deflated as
//! `<src dir name>/<relative path>` in `UAM_fullpack_<YYYYMMDD_HHMMSS>.zip`
//! inside `dest`. A `dest` nested inside `src` is not packed into itself.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::PackSummary;
use crate::error::AppError;
use crate::io::sha256_file;

/// File name prefix of every packed archive.
pub const PACK_PREFIX: &str = "UAM_fullpack";

/// Pack `src` into a timestamped archive in `dest`.
pub fn pack_tree(src: &Path, dest: &Path) -> Result<PackSummary, AppError> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    pack_tree_as(src, dest, &format!("{PACK_PREFIX}_{stamp}.zip"))
}

/// Pack `src` into `dest/<name>`.
pub fn pack_tree_as(src: &Path, dest: &Path, name: &str) -> Result<PackSummary, AppError> {
    if !src.is_dir() {
        return Err(AppError::new(
            2,
            format!("Pack source '{}' is not a directory.", src.display()),
        ));
    }
    fs::create_dir_all(dest)
        .map_err(|e| AppError::new(2, format!("Failed to create pack dir '{}': {e}", dest.display())))?;

    let src = canonical(src)?;
    let dest = canonical(dest)?;
    let root = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tree".to_string());

    let out_path = dest.join(name);
    let out = File::create(&out_path)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", out_path.display())))?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let walker = WalkDir::new(&src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || (e.path() != dest && e.path() != out_path));

    let mut files = 0;
    for entry in walker {
        let entry = entry
            .map_err(|e| AppError::new(4, format!("Failed to walk '{}': {e}", src.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(&src).map_err(|e| {
            AppError::new(4, format!("'{}' escaped '{}': {e}", entry.path().display(), src.display()))
        })?;
        let arc_name = archive_name(&root, rel);

        writer
            .start_file(arc_name.as_str(), options)
            .map_err(|e| zip_error(&out_path, e))?;
        let mut input = File::open(entry.path())
            .map_err(|e| AppError::new(4, format!("Failed to open '{}': {e}", entry.path().display())))?;
        io::copy(&mut input, &mut writer)
            .map_err(|e| AppError::new(4, format!("Failed to pack '{}': {e}", entry.path().display())))?;

        debug!(file = %arc_name, "packed");
        files += 1;
    }
    writer.finish().map_err(|e| zip_error(&out_path, e))?;

    let bytes = fs::metadata(&out_path)
        .map_err(|e| AppError::new(4, format!("Failed to stat '{}': {e}", out_path.display())))?
        .len();
    let sha256 = sha256_file(&out_path)?;
    info!(archive = %out_path.display(), files, bytes, %sha256, "pack complete");

    Ok(PackSummary {
        path: out_path,
        files,
        bytes,
        sha256,
    })
}

fn canonical(path: &Path) -> Result<PathBuf, AppError> {
    path.canonicalize()
        .map_err(|e| AppError::new(2, format!("Failed to resolve '{}': {e}", path.display())))
}

fn zip_error(path: &Path, err: zip::result::ZipError) -> AppError {
    AppError::new(4, format!("Failed to write '{}': {err}", path.display()))
}

/// `root/a/b` with forward slashes on every platform.
fn archive_name(root: &str, rel: &Path) -> String {
    let mut name = root.to_string();
    for part in rel.components() {
        name.push('/');
        name.push_str(&part.as_os_str().to_string_lossy());
    }
    name
}
