use crate::error::AppError;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// A single named value holding the whole serialized history log.
///
/// Reads and writes always move the complete value; there are no partial
/// updates.
pub trait HistorySlot {
    /// Returns `None` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, AppError>;

    fn write(&self, content: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySlot for FileSlot {
    fn read(&self) -> Result<Option<String>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))
    }

    fn write(&self, content: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
        }

        std::fs::write(&self.path, content)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        Ok(())
    }
}

/// In-process slot, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    content: RefCell<Option<String>>,
    writes: Cell<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: RefCell::new(Some(content.into())),
            writes: Cell::new(0),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl HistorySlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, AppError> {
        Ok(self.content.borrow().clone())
    }

    fn write(&self, content: &str) -> Result<(), AppError> {
        *self.content.borrow_mut() = Some(content.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSlot, HistorySlot, MemorySlot};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("teachertask-{nanos}-{file_name}"))
    }

    #[test]
    fn file_slot_reads_none_when_missing() {
        let slot = FileSlot::new(temp_path("missing.json"));
        assert_eq!(slot.read().unwrap(), None);
    }

    #[test]
    fn file_slot_creates_parent_directories() {
        let dir = temp_path("nested");
        let slot = FileSlot::new(dir.join("deeper").join("history.json"));

        slot.write("[]").unwrap();
        let content = slot.read().unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(content.as_deref(), Some("[]"));
    }

    #[cfg(unix)]
    #[test]
    fn file_slot_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("perms.json");
        let slot = FileSlot::new(&path);
        slot.write("[]").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        fs::remove_file(&path).ok();

        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_slot_counts_writes() {
        let slot = MemorySlot::new();
        slot.write("[]").unwrap();
        slot.write("[1]").unwrap();

        assert_eq!(slot.write_count(), 2);
        assert_eq!(slot.read().unwrap().as_deref(), Some("[1]"));
    }
}
