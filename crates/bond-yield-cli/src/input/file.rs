use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Read a JSON file into a typed struct, e.g. a solver configuration.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let path = locate(path)?;
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    debug!(path = %path.display(), bytes = contents.len(), "read input file");
    super::parse_request(&format!("'{}'", path.display()), &contents)
}

/// Read a JSON file as an untyped value. Bond requests go through this so the
/// field-level validation can see unknown and mistyped properties.
pub fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    read_json(path)
}

/// Absolute path of an existing regular file. Relative paths resolve against
/// the working directory.
fn locate(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = std::env::current_dir()?.join(path);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(path),
        Ok(_) => Err(format!("Not a file: {}", path.display()).into()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(format!("File not found: {}", path.display()).into())
        }
        Err(e) => Err(format!("Cannot access '{}': {}", path.display(), e).into()),
    }
}
