use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default download name: the requested stem with a `.csv` extension.
pub fn export_file_name(filename: &str) -> String {
    let stem = filename.trim().trim_end_matches(".csv");
    if stem.is_empty() {
        "export.csv".to_string()
    } else {
        format!("{stem}.csv")
    }
}

pub fn write_csv_file(path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
    }
    let mut data = contents.to_string();
    if !data.is_empty() {
        data.push('\n');
    }
    std::fs::write(path, data)
        .with_context(|| format!("failed to write csv: {}", path.display()))?;
    Ok(path.to_path_buf())
}
