#![allow(dead_code)]

use psvd::{
    catalog::SqliteCatalog,
    config::{CATALOG_FILE, COURSES_DIR},
    export::Exporter,
    naming,
};
use rusqlite::{Connection, params};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

const SCHEMA: &str = r#"
CREATE TABLE Course (
    Name TEXT PRIMARY KEY, Title TEXT, AuthorsFullnames TEXT, DefaultImageUrl TEXT,
    Description TEXT, DurationInMilliseconds INTEGER, HasTranscript INTEGER,
    ImageUrl TEXT, IsStale INTEGER, Level TEXT, ReleaseDate TEXT,
    ShortDescription TEXT, UpdatedDate TEXT
);
CREATE TABLE Module (
    Id INTEGER PRIMARY KEY, Name TEXT, Title TEXT, CourseName TEXT,
    AuthorHandle TEXT, ModuleIndex INTEGER, Description TEXT,
    DurationInMilliseconds INTEGER
);
CREATE TABLE Clip (
    Id INTEGER PRIMARY KEY, Name TEXT, Title TEXT, ModuleId INTEGER,
    ClipIndex INTEGER, DurationInMilliseconds INTEGER, SupportsStandard INTEGER,
    SupportsWidescreen INTEGER
);
CREATE TABLE ClipTranscript (
    Id INTEGER PRIMARY KEY, ClipId INTEGER, StartTime INTEGER, EndTime INTEGER,
    Text TEXT
);
"#;

/// A fake viewer install inside a temporary directory.
pub struct Install {
    pub dir: TempDir,
    pub root: PathBuf,
    pub output: PathBuf,
    conn: Connection,
}

impl Install {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pluralsight");
        fs::create_dir_all(root.join(COURSES_DIR)).unwrap();

        let conn = Connection::open(root.join(CATALOG_FILE)).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        Self {
            output: dir.path().join("output"),
            dir,
            root,
            conn,
        }
    }

    pub fn courses(&self) -> PathBuf {
        self.root.join(COURSES_DIR)
    }

    /// Catalog row only, the course is not downloaded.
    pub fn course(&self, name: &str, title: &str) {
        self.conn
            .execute(
                "INSERT INTO Course (Name, Title, DurationInMilliseconds) VALUES (?1, ?2, 60000)",
                params![name, title],
            )
            .unwrap();
    }

    /// Catalog row plus the course source directory.
    pub fn downloaded_course(&self, name: &str, title: &str) -> PathBuf {
        self.course(name, title);
        let path = self.courses().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Catalog row only, returns where its source directory belongs.
    pub fn module(&self, id: i64, course: &str, index: i64, name: &str, title: &str) -> PathBuf {
        self.conn
            .execute(
                "INSERT INTO Module VALUES (?1, ?2, ?3, ?4, 'author', ?5, NULL, 30000)",
                params![id, name, title, course, index],
            )
            .unwrap();
        self.courses()
            .join(course)
            .join(naming::module_hash(name, "author"))
    }

    /// Catalog row plus the module source directory.
    pub fn downloaded_module(&self, id: i64, course: &str, index: i64, name: &str, title: &str) -> PathBuf {
        let path = self.module(id, course, index, name, title);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn clip(&self, id: i64, module_id: i64, index: i64, name: &str, title: &str) {
        self.conn
            .execute(
                "INSERT INTO Clip VALUES (?1, ?2, ?3, ?4, ?5, 15000, 1, 1)",
                params![id, name, title, module_id, index],
            )
            .unwrap();
    }

    pub fn transcript(&self, clip_id: i64, start: i64, end: i64, text: &str) {
        self.conn
            .execute(
                "INSERT INTO ClipTranscript (ClipId, StartTime, EndTime, Text) VALUES (?1, ?2, ?3, ?4)",
                params![clip_id, start, end, text],
            )
            .unwrap();
    }

    /// Obfuscate `plain` the way the viewer stores clips and write it as `<name>.psv`.
    pub fn write_clip(&self, module_dir: &Path, name: &str, plain: &[u8]) {
        let mut data = plain.to_vec();
        psvd_media::cipher::apply_keystream(&mut data, 0);
        fs::write(module_dir.join(format!("{name}.psv")), data).unwrap();
    }

    pub fn exporter(&self) -> Exporter<SqliteCatalog> {
        let catalog = SqliteCatalog::open(self.root.join(CATALOG_FILE)).unwrap();
        Exporter::new(catalog, self.courses(), &self.output).threads(2)
    }
}

pub fn plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}
