//! Test helpers for staging feature selection documents on disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const BUILDINGS_AND_ROADS: &str = "\
buildings:
  types: [points, polygons]
  select: [name, building]
  where: building IS NOT NULL
Main Roads:
  types: [lines]
  select: [name, highway]
";

pub(super) const RESERVED_THEME: &str = "points:\n  select: [name]\n";

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn document(&self, contents: &str) -> Utf8PathBuf {
        let path = self.root.join("themes.yml");
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write test file");
}

pub(super) fn read_utf8(path: &Utf8Path) -> String {
    fs::read_to_string(path).expect("read test file")
}
