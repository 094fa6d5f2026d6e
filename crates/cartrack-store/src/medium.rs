use crate::fsync_dir;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Raw byte storage underneath a [`TableStore`](crate::TableStore).
///
/// `write` and `copy` replace the whole destination. The table protocol
/// (backup, write, restore) is built on top of these four calls.
pub trait TableMedium {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Local filesystem medium.
///
/// Writes and copies land in a temporary file next to the destination and
/// are renamed over it, so readers see either the old or the new file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMedium;

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

impl TableMedium for FsMedium {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let dir = parent_dir(path);
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        fsync_dir(dir)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let dir = parent_dir(to);
        let tmp = NamedTempFile::new_in(dir)?;
        fs::copy(from, tmp.path())?;
        tmp.as_file().sync_all()?;
        tmp.persist(to).map_err(|e| e.error)?;
        fsync_dir(dir)
    }
}
