use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::error::{Result, WatchError};
use crate::domain::{ChapterDescriptor, Series};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| WatchError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            WatchError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

fn row_to_series(row: &rusqlite::Row<'_>) -> rusqlite::Result<Series> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let url: String = row.get(2)?;
    let scan: String = row.get(3)?;
    let hours: String = row.get(4)?;

    let scan = scan.parse().map_err(|e| column_error(3, e))?;
    let check_hours = Series::parse_check_hours(&hours).map_err(|e| column_error(4, e))?;
    Series::new(id, title, url, scan, check_hours).map_err(|e| column_error(4, e))
}

fn column_error(index: usize, e: WatchError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
}

impl Store for SqliteStore {
    fn add_series(&self, series: &Series) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO series (id, title, url, scan, check_hours, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 title = ?2, url = ?3, scan = ?4, check_hours = ?5",
            params![
                series.id,
                series.title,
                series.url,
                series.scan.as_str(),
                series.check_hours_string(),
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(())
    }

    fn get_series(&self, id: &str) -> Result<Option<Series>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT id, title, url, scan, check_hours FROM series WHERE id = ?1",
                params![id],
                row_to_series,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_series(&self) -> Result<Vec<Series>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT id, title, url, scan, check_hours FROM series ORDER BY id")?;

        let series = stmt
            .query_map([], row_to_series)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(series)
    }

    fn remove_series(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute("DELETE FROM series WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn get_last_chapter(&self, series_id: &str) -> Result<Option<ChapterDescriptor>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT chapter_number, chapter_description, chapter_url
                 FROM last_chapters WHERE series_id = ?1",
                params![series_id],
                |row| {
                    Ok(ChapterDescriptor {
                        number: row.get(0)?,
                        description: row.get(1)?,
                        url: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn set_last_chapter(&self, series_id: &str, chapter: &ChapterDescriptor) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO last_chapters
                 (series_id, chapter_number, chapter_description, chapter_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(series_id) DO UPDATE SET
                 chapter_number = ?2, chapter_description = ?3,
                 chapter_url = ?4, updated_at = ?5",
            params![
                series_id,
                chapter.number,
                chapter.description,
                chapter.url,
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(())
    }
}
