use std::{
    collections::BTreeMap,
    error, fmt, fs,
    io::Error as IoError,
    path::{Path, PathBuf},
};

use serde_json::{Error as SerdeJsonError, Map, Value};
use tracing::{debug, warn};

pub const PASS_JSON: &str = "pass.json";
pub const MANIFEST_JSON: &str = "manifest.json";
pub const SIGNATURE: &str = "signature";

const LPROJ_SUFFIX: &str = ".lproj";

/// A pass template: `pass.json` plus the assets packaged next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PassModel {
    pass_json: Map<String, Value>,
    files: BTreeMap<String, Vec<u8>>,
}

impl PassModel {
    pub fn new(pass_json: Map<String, Value>) -> Self {
        Self {
            pass_json,
            files: BTreeMap::new(),
        }
    }

    /// `name` is the archive path, e.g. `icon.png` or `en.lproj/pass.strings`.
    pub fn with_file(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), bytes.into());
        self
    }

    /// Loads a model directory.
    ///
    /// Regular top-level files are kept, as are files one level down inside
    /// `*.lproj` directories. Hidden entries and other directories are
    /// skipped. `manifest.json` and `signature` are generated at packaging
    /// time, so stale copies in the directory are dropped.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ModelError> {
        let dir = dir.as_ref();

        let mut pass_json = None;
        let mut files = BTreeMap::new();

        for (name, path, is_dir) in list_dir(dir)? {
            if is_dir {
                if !name.ends_with(LPROJ_SUFFIX) {
                    debug!(path = %path.display(), "skipping non-localization directory");
                    continue;
                }
                for (file_name, file_path, is_dir) in list_dir(&path)? {
                    if is_dir {
                        debug!(path = %file_path.display(), "skipping nested directory");
                        continue;
                    }
                    files.insert(format!("{name}/{file_name}"), read_file(&file_path)?);
                }
                continue;
            }

            match name.as_str() {
                PASS_JSON => pass_json = Some(read_file(&path)?),
                MANIFEST_JSON | SIGNATURE => {
                    debug!(path = %path.display(), "skipping generated file");
                }
                _ => {
                    files.insert(name, read_file(&path)?);
                }
            }
        }

        let pass_json = pass_json.ok_or_else(|| ModelError::PassJsonMissing(dir.to_owned()))?;
        let pass_json = match serde_json::from_slice::<Value>(&pass_json)
            .map_err(ModelError::PassJsonParseFailed)?
        {
            Value::Object(map) => map,
            _ => return Err(ModelError::PassJsonNotObject),
        };

        debug!(dir = %dir.display(), files = files.len(), "model loaded");

        Ok(Self { pass_json, files })
    }

    pub fn pass_json(&self) -> &Map<String, Value> {
        &self.pass_json
    }

    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    pub fn into_parts(self) -> (Map<String, Value>, BTreeMap<String, Vec<u8>>) {
        (self.pass_json, self.files)
    }
}

// (name, path, is_dir)
fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>, ModelError> {
    let read_dir_failed = |err| ModelError::ReadDirFailed(dir.to_owned(), err);

    let mut entries = vec![];
    for entry in fs::read_dir(dir).map_err(read_dir_failed)? {
        let entry = entry.map_err(read_dir_failed)?;
        let path = entry.path();

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(name) => {
                warn!(?name, "skipping non UTF-8 file name");
                continue;
            }
        };
        if name.starts_with('.') {
            continue;
        }

        let metadata = fs::metadata(&path).map_err(read_dir_failed)?;
        if metadata.is_dir() {
            entries.push((name, path, true));
        } else if metadata.is_file() {
            entries.push((name, path, false));
        }
    }
    Ok(entries)
}

fn read_file(path: &Path) -> Result<Vec<u8>, ModelError> {
    fs::read(path).map_err(|err| ModelError::ReadFileFailed(path.to_owned(), err))
}

//
#[derive(Debug)]
pub enum ModelError {
    ReadDirFailed(PathBuf, IoError),
    ReadFileFailed(PathBuf, IoError),
    PassJsonMissing(PathBuf),
    PassJsonParseFailed(SerdeJsonError),
    PassJsonNotObject,
}
impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl error::Error for ModelError {}
