//! Pluggable file access for [`crate::parser::Parser::parse_file_with`].
//!
//! Mirrors the crate's other injection points (`NumericBackend`): tests and
//! embedders can hand in an in-memory or sandboxed source instead of
//! touching the real filesystem.

use std::fs;
use std::io;
use std::path::Path;

/// A source of file contents, read as UTF-8 text.
pub trait BufferSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The default [`BufferSource`], backed by [`std::fs::read_to_string`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBufferSource;

impl BufferSource for FsBufferSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct MapSource(HashMap<PathBuf, String>);

    impl BufferSource for MapSource {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not found"))
        }
    }

    #[test]
    fn in_memory_source_serves_registered_paths() {
        let mut map = HashMap::new();
        map.insert(PathBuf::from("/virtual/a.json"), "{}".to_string());
        let source = MapSource(map);
        assert_eq!(source.read_to_string(Path::new("/virtual/a.json")).unwrap(), "{}");
        assert!(source.read_to_string(Path::new("/virtual/missing.json")).is_err());
    }
}
