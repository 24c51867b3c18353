use crate::{error::Error, Result};
use alloy::json_abi::JsonAbi;
use std::path::{Path, PathBuf};

/// Reads interface descriptions from `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct AbiStore {
    dir: PathBuf,
}

impl AbiStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Loads the ABI for `name`. Accepts a bare ABI array or a compiler artifact with an `abi` key.
    pub fn load(&self, name: &str) -> Result<JsonAbi> {
        let path = self.path_for(name);
        let contents = std::fs::read_to_string(&path).map_err(|_| Error::AbiMissing {
            name: name.to_owned(),
            path: path.clone(),
        })?;
        parse_abi(name, &contents)
    }
}

fn parse_abi(name: &str, contents: &str) -> Result<JsonAbi> {
    let malformed = |reason: String| Error::AbiMalformed {
        name: name.to_owned(),
        reason,
    };
    let json: serde_json::Value =
        serde_json::from_str(contents).map_err(|e| malformed(e.to_string()))?;
    let abi = match json {
        serde_json::Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| malformed("artifact has no 'abi' key".to_owned()))?,
        other => other,
    };
    let abi: JsonAbi = serde_json::from_value(abi).map_err(|e| malformed(e.to_string()))?;
    if abi.functions.is_empty() {
        return Err(malformed("no functions declared".to_owned()));
    }
    Ok(abi)
}
