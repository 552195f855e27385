use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::spec::{TestSpec, decode_spec};
use crate::testing::UnittestReport;

pub fn read_documentation(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Load a spec from a JSON file, top-level or wrapped like the generator's
/// response.
pub fn load_spec(path: &Path) -> Result<TestSpec> {
    let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
    decode_spec(&raw)
}

/// Write `report` as indented JSON and mark it persisted once the write
/// succeeded. Returns the absolute path written.
pub fn write_report(path: &Path, report: &mut UnittestReport) -> Result<PathBuf> {
    let path = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    report.persisted = false;
    let raw = serde_json::to_string_pretty(report)?;
    fs::write(&path, raw).map_err(|e| Error::io(&path, e))?;
    report.persisted = true;

    Ok(path)
}
