// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    read_only: HashSet<PathBuf>,
    executable: HashSet<PathBuf>,
}

/// In-memory filesystem for resolver / writer tests.
///
/// Parents are created implicitly. Directories marked with
/// [`MockFileSystem::set_read_only`] reject new children.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut state = self.state.lock().unwrap();
        Self::insert_entry(&mut state.entries, path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state.lock().unwrap();
        if !matches!(state.entries.get(path), Some(MockEntry::Dir(_))) {
            Self::insert_entry(&mut state.entries, path, MockEntry::Dir(Vec::new()));
        }
    }

    pub fn set_read_only(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.read_only.insert(path.as_ref().to_path_buf());
    }

    pub fn is_executable(&self, path: impl AsRef<Path>) -> bool {
        let state = self.state.lock().unwrap();
        state.executable.contains(path.as_ref())
    }

    fn insert_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, entry: MockEntry) {
        entries.insert(path.to_path_buf(), entry);
        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Self::ensure_dir_entry(entries, parent);
            Self::link_child(entries, parent, path);
        }
    }

    fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if parent != path {
                Self::ensure_dir_entry(entries, parent);
                Self::link_child(entries, parent, path);
            }
        }
    }

    fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn check_writable(state: &MockState, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if state.read_only.contains(parent) => {
                Err(anyhow!("Permission denied: {:?}", path))
            }
            _ => Ok(()),
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state, path)?;
        if let Some(MockEntry::Dir(_)) = state.entries.get(path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        Self::insert_entry(&mut state.entries, path, MockEntry::File(contents.to_vec()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        let state = self.state.lock().unwrap();
        if state.entries.contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("No such file or directory: {:?}", path))
        }
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_writable(&state, path)?;
        if state.entries.contains_key(path) {
            return Err(anyhow!("Already exists: {:?}", path));
        }
        Self::insert_entry(&mut state.entries, path, MockEntry::Dir(Vec::new()));
        Ok(())
    }

    fn set_executable(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File(_)) => {
                state.executable.insert(path.to_path_buf());
                Ok(())
            }
            _ => Err(anyhow!("Not a file: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
