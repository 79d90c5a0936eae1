//! File tree walker collaborator
//!
//! Discovery only needs one guarantee from the walker: every regular file
//! under the root is visited exactly once, and traversal failures surface
//! as errors. Directories and special files never reach the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Iterator over regular files, yielding traversal errors inline
pub type FileIter = Box<dyn Iterator<Item = io::Result<PathBuf>> + Send>;

/// Walks a directory tree, yielding every regular file exactly once
pub trait FileWalker: Send + Sync {
    /// Start a walk rooted at `root`
    ///
    /// A root that cannot be read fails immediately; errors on nested
    /// directories are yielded as iterator items and abort discovery
    /// upstream.
    fn walk(&self, root: &Path) -> io::Result<FileIter>;
}

/// Default walker backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsWalker;

impl FileWalker for OsWalker {
    fn walk(&self, root: &Path) -> io::Result<FileIter> {
        let entries = fs::read_dir(root)?;
        Ok(Box::new(OsWalkIter {
            pending: Vec::new(),
            current: Some(entries),
        }))
    }
}

struct OsWalkIter {
    pending: Vec<PathBuf>,
    current: Option<fs::ReadDir>,
}

impl Iterator for OsWalkIter {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(entries) = self.current.as_mut() else {
                let dir = self.pending.pop()?;
                match fs::read_dir(&dir) {
                    Ok(entries) => {
                        self.current = Some(entries);
                        continue;
                    }
                    Err(e) => return Some(Err(e)),
                }
            };

            match entries.next() {
                Some(Ok(entry)) => match entry.file_type() {
                    Ok(kind) if kind.is_dir() => self.pending.push(entry.path()),
                    Ok(kind) if kind.is_file() => return Some(Ok(entry.path())),
                    // Symlinks and special files are not archives.
                    Ok(_) => {}
                    Err(e) => return Some(Err(e)),
                },
                Some(Err(e)) => return Some(Err(e)),
                None => self.current = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs::File;

    #[test]
    fn test_walk_visits_every_regular_file_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("host1/cpu")).unwrap();
        fs::create_dir_all(dir.path().join("host2")).unwrap();
        File::create(dir.path().join("host1/load.rrd")).unwrap();
        File::create(dir.path().join("host1/cpu/user.rrd")).unwrap();
        File::create(dir.path().join("host2/load.rrd")).unwrap();

        let walker = OsWalker;
        let files: BTreeSet<PathBuf> = walker
            .walk(dir.path())
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();

        let expected: BTreeSet<PathBuf> = [
            dir.path().join("host1/load.rrd"),
            dir.path().join("host1/cpu/user.rrd"),
            dir.path().join("host2/load.rrd"),
        ]
        .into_iter()
        .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_walk_skips_directories_in_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        let walker = OsWalker;
        let files: Vec<_> = walker.walk(dir.path()).unwrap().collect();
        assert!(files.is_empty());
    }

    #[test]
    fn test_walk_unreadable_root_fails() {
        let walker = OsWalker;
        assert!(walker.walk(Path::new("/nonexistent-walker-root")).is_err());
    }
}
