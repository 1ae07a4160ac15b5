//! Metadata loader handed out under `metadata/loader`.
//!
//! Metadata for ident `a/b/c` lives in `<base_path>/<path>/a/b/c.json`.
//! Configured paths are consulted in order and the first file found wins.

use crate::components::cache::CachePool;
use crate::components::logger::ServiceLogger;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::rc::Rc;

const CACHE_PREFIX: &str = "metadata/";

#[derive(Debug)]
pub enum MetadataError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    NotAnObject(PathBuf),
}

impl Display for MetadataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read metadata `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid metadata `{}`: {source}", path.display())
            }
            Self::NotAnObject(path) => {
                write!(f, "metadata `{}` must be a JSON object", path.display())
            }
        }
    }
}

impl Error for MetadataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::NotAnObject(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct MetadataLoader {
    logger: Rc<ServiceLogger>,
    cache: Rc<CachePool>,
    base_path: PathBuf,
    paths: Vec<String>,
}

impl MetadataLoader {
    pub fn new(
        logger: Rc<ServiceLogger>,
        cache: Rc<CachePool>,
        base_path: impl Into<PathBuf>,
        paths: Vec<String>,
    ) -> Self {
        Self {
            logger,
            cache,
            base_path: base_path.into(),
            paths,
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Loads and caches metadata. Unknown idents yield `{}`.
    pub fn load(&self, ident: &str) -> Result<Value, MetadataError> {
        let cache_key = format!("{CACHE_PREFIX}{ident}");
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let metadata = match self.find(ident) {
            Some(file) => read_object(file)?,
            None => {
                self.logger.warn(&format!(
                    "event=metadata_load module=components status=missing ident={ident}"
                ));
                Value::Object(Default::default())
            }
        };
        self.cache.set(cache_key, metadata.clone(), None);
        Ok(metadata)
    }

    fn find(&self, ident: &str) -> Option<PathBuf> {
        self.paths
            .iter()
            .map(|path| self.base_path.join(path).join(format!("{ident}.json")))
            .find(|file| file.is_file())
    }
}

fn read_object(file: PathBuf) -> Result<Value, MetadataError> {
    let raw = std::fs::read_to_string(&file).map_err(|source| MetadataError::Read {
        path: file.clone(),
        source,
    })?;
    let parsed: Value = serde_json::from_str(&raw).map_err(|source| MetadataError::Parse {
        path: file.clone(),
        source,
    })?;
    if parsed.is_object() {
        Ok(parsed)
    } else {
        Err(MetadataError::NotAnObject(file))
    }
}

#[cfg(test)]
mod tests {
    use super::MetadataLoader;
    use crate::components::cache::CachePool;
    use crate::components::logger::ServiceLogger;
    use serde_json::json;
    use std::rc::Rc;

    #[test]
    fn first_path_wins_and_is_cached() {
        let dir = tempfile::tempdir().expect("temp dir");
        for (path, body) in [
            ("metadata", r#"{"label":"User","properties":{"email":{"type":"email"}}}"#),
            ("overrides", r#"{"properties":{"name":{"type":"string"}}}"#),
        ] {
            let target = dir.path().join(path).join("charcoal/admin");
            std::fs::create_dir_all(&target).expect("create metadata dir");
            std::fs::write(target.join("user.json"), body).expect("write metadata");
        }

        let cache = Rc::new(CachePool::new());
        let loader = MetadataLoader::new(
            Rc::new(ServiceLogger::null()),
            Rc::clone(&cache),
            dir.path(),
            vec!["metadata".to_string(), "overrides".to_string()],
        );

        let metadata = loader.load("charcoal/admin/user").expect("metadata loads");
        assert_eq!(metadata["label"], "User");
        assert_eq!(metadata["properties"]["email"], json!({ "type": "email" }));
        assert!(metadata["properties"].get("name").is_none());
        assert!(cache.has("metadata/charcoal/admin/user"));
    }

    #[test]
    fn unknown_ident_loads_empty_object() {
        let dir = tempfile::tempdir().expect("temp dir");
        let loader = MetadataLoader::new(
            Rc::new(ServiceLogger::null()),
            Rc::new(CachePool::new()),
            dir.path(),
            vec!["metadata".to_string()],
        );
        assert_eq!(loader.load("missing").expect("empty metadata"), json!({}));
    }

    #[test]
    fn rejects_non_object_metadata() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("metadata");
        std::fs::create_dir_all(&target).expect("create metadata dir");
        std::fs::write(target.join("list.json"), "[1, 2]").expect("write metadata");

        let loader = MetadataLoader::new(
            Rc::new(ServiceLogger::null()),
            Rc::new(CachePool::new()),
            dir.path(),
            vec!["metadata".to_string()],
        );
        assert!(matches!(
            loader.load("list"),
            Err(super::MetadataError::NotAnObject(_))
        ));
    }
}
