//! Local key/value store
//!
//! File-backed stand-in for browser `localStorage`: one JSON object per
//! file, loaded and saved on every call.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ClientResult;

pub const DEFAULT_STORE_FILE: &str = "local_storage.json";

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl AsRef<Path>, filename: &str) -> Self {
        Self {
            path: dir.as_ref().join(filename),
        }
    }

    /// Store under `dir` with the default file name
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir, DEFAULT_STORE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Map<String, Value> {
        let Ok(json) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str(&json) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "Local store is corrupt, starting empty");
                Map::new()
            }
        }
    }

    fn save(&self, map: &Map<String, Value>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Raw value under `key`
    pub fn get_raw(&self, key: &str) -> Option<Value> {
        self.load().remove(key)
    }

    /// Typed value under `key`; `Ok(None)` when absent, an error when it does
    /// not decode as `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> ClientResult<Option<T>> {
        match self.get_raw(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> ClientResult<()> {
        let mut map = self.load();
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.save(&map)
    }

    /// Returns whether the key existed
    pub fn remove(&self, key: &str) -> ClientResult<bool> {
        let mut map = self.load();
        if map.remove(key).is_none() {
            return Ok(false);
        }
        self.save(&map)?;
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.load().contains_key(key)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.load()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Remove several keys at once; returns how many existed
    pub fn remove_many<S: AsRef<str>>(&self, keys: &[S]) -> ClientResult<usize> {
        let mut map = self.load();
        let removed = keys
            .iter()
            .filter(|k| map.remove(k.as_ref()).is_some())
            .count();
        if removed > 0 {
            self.save(&map)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::in_dir(dir.path());
        assert_eq!(store.get::<String>("authToken").unwrap(), None);

        store.set("authToken", &"abc").unwrap();
        store.set("count", &3).unwrap();
        assert_eq!(store.get::<String>("authToken").unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get::<i32>("count").unwrap(), Some(3));

        assert!(store.remove("authToken").unwrap());
        assert!(!store.remove("authToken").unwrap());
        assert!(store.contains("count"));
    }

    #[test]
    fn test_wrong_type_is_error() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::in_dir(dir.path());
        store.set("count", &"three").unwrap();
        assert!(store.get::<i32>("count").is_err());
    }

    #[test]
    fn test_prefix_and_remove_many() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::in_dir(dir.path().join("nested"));
        store.set("newMember:1", &1).unwrap();
        store.set("newMember:2", &2).unwrap();
        store.set("user", &"x").unwrap();

        let mut keys = store.keys_with_prefix("newMember:");
        keys.sort();
        assert_eq!(keys, vec!["newMember:1", "newMember:2"]);
        assert_eq!(store.remove_many(&keys).unwrap(), 2);
        assert_eq!(store.remove_many(&["missing"]).unwrap(), 0);
        assert!(store.contains("user"));
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.get_raw("anything").is_none());
        store.set("k", &1).unwrap();
        assert_eq!(store.get::<i32>("k").unwrap(), Some(1));
    }
}
