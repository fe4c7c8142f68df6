//! Spec discovery, fingerprinting, and raw parsing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{SpecFile, SpecFingerprint};

/// Outcome of loading one discovered file: either a parsed spec, or a
/// parse failure that still needs a stable `spec_id` and a catalog entry
/// (the file degrades to `is_valid=false` rather than failing the refresh).
pub enum SpecLoadResult {
    Loaded(SpecFile),
    Failed { spec_id: String, path: String, relative_path: String, error: String },
}

/// Walk `spec_dir` for `.json`/`.yaml`/`.yml` files (case-insensitive
/// extension match), returning absolute paths in sorted order.
pub fn discover_spec_files(spec_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(spec_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_spec_extension(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_spec_extension(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => matches!(ext.to_ascii_lowercase().as_str(), "json" | "yaml" | "yml"),
        None => false,
    }
}

/// Stat every discovered spec file, relative to `spec_dir`.
pub fn fingerprint_spec_files(spec_dir: &Path) -> Result<Vec<SpecFingerprint>> {
    let spec_dir = spec_dir
        .canonicalize()
        .map_err(|e| Error::spec(format!("spec directory {}: {e}", spec_dir.display())))?;
    let mut fingerprints = Vec::new();
    for path in discover_spec_files(&spec_dir)? {
        let metadata = std::fs::metadata(&path)?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let relative_path = path
            .strip_prefix(&spec_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        fingerprints.push(SpecFingerprint {
            path: path.to_string_lossy().to_string(),
            relative_path,
            size: metadata.len(),
            mtime,
        });
    }
    Ok(fingerprints)
}

/// Parse a spec file's contents as JSON or YAML, dispatching on extension.
pub fn load_raw_spec(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(serde_yaml::from_str(&contents)?)
    }
}

fn default_spec_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "spec".to_string())
}

fn spec_id_override(raw: &Value) -> Option<String> {
    let override_value = raw.get("info")?.get("x-spec-id")?.as_str()?.trim();
    if override_value.is_empty() {
        None
    } else {
        Some(override_value.to_string())
    }
}

fn ensure_unique(base_id: &str, used: &HashSet<String>) -> String {
    if !used.contains(base_id) {
        return base_id.to_string();
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base_id}-{suffix}");
        if !used.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Discover, parse, and assign stable `spec_id`s to every spec file under
/// `spec_dir`. Collisions (two files that would share a `spec_id`) are
/// resolved by appending `-2`, `-3`, ... in discovery order. A file that
/// fails to parse does not fail the whole batch: it comes back as
/// `SpecLoadResult::Failed` so the caller can still register it as an
/// `is_valid=false` catalog entry (per spec.md §4.1 / §7).
pub fn build_spec_files(spec_dir: &Path) -> Result<Vec<SpecLoadResult>> {
    let spec_dir = spec_dir
        .canonicalize()
        .map_err(|e| Error::spec(format!("spec directory {}: {e}", spec_dir.display())))?;
    let mut used_ids = HashSet::new();
    let mut results = Vec::new();
    for path in discover_spec_files(&spec_dir)? {
        let relative_path = path
            .strip_prefix(&spec_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        match load_raw_spec(&path) {
            Ok(raw) => {
                let base_id = spec_id_override(&raw).unwrap_or_else(|| default_spec_id(&path));
                let spec_id = ensure_unique(&base_id, &used_ids);
                used_ids.insert(spec_id.clone());
                results.push(SpecLoadResult::Loaded(SpecFile {
                    path: path.to_string_lossy().to_string(),
                    relative_path,
                    raw,
                    spec_id,
                }));
            }
            Err(err) => {
                let base_id = default_spec_id(&path);
                let spec_id = ensure_unique(&base_id, &used_ids);
                used_ids.insert(spec_id.clone());
                results.push(SpecLoadResult::Failed {
                    spec_id,
                    path: path.to_string_lossy().to_string(),
                    relative_path,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(results)
}
