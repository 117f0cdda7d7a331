//! Read-only access to the viewer's catalog.

mod models;

pub use models::{Clip, ClipTranscript, Course, Module};

use rusqlite::{Connection, OpenFlags, Params, Row, types::ValueRef};
use std::path::Path;
use thiserror::Error;

/// A failed catalog query.
#[derive(Debug, Error)]
#[error("catalog query on {table} failed: {source}")]
pub struct CatalogError {
    table: &'static str,
    #[source]
    source: rusqlite::Error,
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// The four record collections the exporter reads.
///
/// Records come back in catalog order and are never written back.
pub trait Catalog {
    fn courses(&self) -> Result<Vec<Course>>;
    fn modules(&self, course_name: &str) -> Result<Vec<Module>>;
    fn clips(&self, module_id: i64) -> Result<Vec<Clip>>;
    fn transcripts(&self, clip_id: i64) -> Result<Vec<ClipTranscript>>;
}

/// Catalog backed by the viewer's SQLite database.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open the database read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn query<T, P: Params>(
        &self,
        table: &'static str,
        sql: &str,
        params: P,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let run = || -> rusqlite::Result<Vec<T>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, map)?;
            rows.collect()
        };

        run().map_err(|source| CatalogError { table, source })
    }
}

impl Catalog for SqliteCatalog {
    fn courses(&self) -> Result<Vec<Course>> {
        self.query(
            "Course",
            "SELECT Name, Title, AuthorsFullnames, DefaultImageUrl, Description,
                    DurationInMilliseconds, HasTranscript, ImageUrl, IsStale, Level,
                    ReleaseDate, ShortDescription, UpdatedDate
             FROM Course",
            [],
            |row| {
                Ok(Course {
                    name: row.get(0)?,
                    title: text(row, 1)?.unwrap_or_default(),
                    authors_fullnames: text(row, 2)?,
                    default_image_url: text(row, 3)?,
                    description: text(row, 4)?,
                    duration_in_milliseconds: int(row, 5)?,
                    has_transcript: row.get(6)?,
                    image_url: text(row, 7)?,
                    is_stale: row.get(8)?,
                    level: text(row, 9)?,
                    release_date: text(row, 10)?,
                    short_description: text(row, 11)?,
                    updated_date: text(row, 12)?,
                })
            },
        )
    }

    fn modules(&self, course_name: &str) -> Result<Vec<Module>> {
        self.query(
            "Module",
            "SELECT Id, Name, Title, CourseName, AuthorHandle, ModuleIndex, Description,
                    DurationInMilliseconds
             FROM Module WHERE CourseName = ?1",
            [course_name],
            |row| {
                Ok(Module {
                    id: row.get(0)?,
                    name: text(row, 1)?.unwrap_or_default(),
                    title: text(row, 2)?.unwrap_or_default(),
                    course_name: text(row, 3)?.unwrap_or_default(),
                    author_handle: text(row, 4)?.unwrap_or_default(),
                    module_index: int(row, 5)?,
                    description: text(row, 6)?,
                    duration_in_milliseconds: int(row, 7)?,
                })
            },
        )
    }

    fn clips(&self, module_id: i64) -> Result<Vec<Clip>> {
        self.query(
            "Clip",
            "SELECT Id, Name, Title, ModuleId, ClipIndex, DurationInMilliseconds,
                    SupportsStandard, SupportsWidescreen
             FROM Clip WHERE ModuleId = ?1",
            [module_id],
            |row| {
                Ok(Clip {
                    id: row.get(0)?,
                    name: text(row, 1)?.unwrap_or_default(),
                    title: text(row, 2)?.unwrap_or_default(),
                    module_id: row.get(3)?,
                    clip_index: int(row, 4)?,
                    duration_in_milliseconds: int(row, 5)?,
                    supports_standard: row.get::<_, Option<bool>>(6)?.unwrap_or_default(),
                    supports_widescreen: row.get::<_, Option<bool>>(7)?.unwrap_or_default(),
                })
            },
        )
    }

    fn transcripts(&self, clip_id: i64) -> Result<Vec<ClipTranscript>> {
        self.query(
            "ClipTranscript",
            "SELECT Id, ClipId, StartTime, EndTime, Text
             FROM ClipTranscript WHERE ClipId = ?1",
            [clip_id],
            |row| {
                Ok(ClipTranscript {
                    id: row.get(0)?,
                    clip_id: row.get(1)?,
                    start_time: int(row, 2)?,
                    end_time: int(row, 3)?,
                    text: text(row, 4)?.unwrap_or_default(),
                })
            },
        )
    }
}

/// Column as text whatever affinity the viewer stored it with (dates vary).
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(x) => Some(x.to_string()),
        ValueRef::Real(x) => Some(x.to_string()),
        ValueRef::Text(x) | ValueRef::Blob(x) => Some(String::from_utf8_lossy(x).into_owned()),
    })
}

fn int(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SqliteCatalog {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
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

            INSERT INTO Course (Name, Title, AuthorsFullnames, DurationInMilliseconds, HasTranscript, ReleaseDate)
                VALUES ('rust-intro', 'Rust: Intro', 'Jo Doe', 3600000, 1, '2019-04-01 00:00:00');
            INSERT INTO Course (Name, Title) VALUES ('bare', NULL);
            INSERT INTO Module VALUES (10, 'basics', 'Basics', 'rust-intro', 'jdoe', 1, NULL, 60000);
            INSERT INTO Module VALUES (11, 'other', 'Other', 'bare', 'jdoe', 1, NULL, NULL);
            INSERT INTO Clip VALUES (100, 'clip-b', 'Second', 10, 2, 30000, 1, 0);
            INSERT INTO Clip VALUES (101, 'clip-a', 'First', 10, 1, 30000, NULL, 1);
            INSERT INTO ClipTranscript VALUES (1, 101, 2000, 3000, 'later');
            INSERT INTO ClipTranscript VALUES (2, 101, 0, 1500, 'Hello');
            "#,
        )
        .unwrap();
        SqliteCatalog::from_connection(conn)
    }

    #[test]
    fn test_courses_with_nullable_columns() {
        let courses = catalog().courses().unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].name, "rust-intro");
        assert_eq!(courses[0].title, "Rust: Intro");
        assert_eq!(courses[0].has_transcript, Some(true));
        assert_eq!(courses[0].release_date.as_deref(), Some("2019-04-01 00:00:00"));
        assert_eq!(courses[1].title, "");
        assert_eq!(courses[1].is_stale, None);
    }

    #[test]
    fn test_filters_by_foreign_key() {
        let catalog = catalog();
        let modules = catalog.modules("rust-intro").unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].author_handle, "jdoe");
        assert!(catalog.modules("missing").unwrap().is_empty());
        assert!(catalog.clips(11).unwrap().is_empty());
    }

    #[test]
    fn test_rows_keep_catalog_order() {
        let catalog = catalog();
        let clips = catalog.clips(10).unwrap();
        let lines = catalog.transcripts(101).unwrap();

        assert_eq!(clips.iter().map(|x| x.id).collect::<Vec<_>>(), [100, 101]);
        assert!(!clips[1].supports_standard);
        assert_eq!(lines.iter().map(|x| x.text.as_str()).collect::<Vec<_>>(), ["later", "Hello"]);
    }

    #[test]
    fn test_metadata_uses_catalog_field_names() {
        let module = &catalog().modules("rust-intro").unwrap()[0];
        let json = serde_json::to_value(module).unwrap();

        assert_eq!(json["AuthorHandle"], "jdoe");
        assert_eq!(json["ModuleIndex"], 1);
        assert_eq!(json["DurationInMilliseconds"], 60000);
    }
}
