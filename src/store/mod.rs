//! Device-local persisted project store.
//!
//! Projects are written through after every committing edit and read back at
//! open time. The section tree is stored as a JSON column; scalar metadata
//! gets its own columns. No cross-device or multi-writer guarantees: reads
//! return the last write on this device, nothing more.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::models::*;

pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

const PROJECT_COLUMNS: &str = "id, title, context, team, institution, \
     min_sections, max_depth, constrained, sections, created_at, updated_at";

impl Store {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Store path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "draftsmith")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("draftsmith.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("store lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY title"
        ))?;

        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row_to_project(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let settings = input.settings.unwrap_or_default();
        let context = input.context.unwrap_or_default();

        conn.execute(
            &format!("INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            (
                id.to_string(),
                &input.title,
                &context,
                &input.team,
                &input.institution,
                settings.min_sections,
                settings.max_depth as i64,
                if settings.constrained { 1 } else { 0 },
                "[]",
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Project {
            id,
            title: input.title,
            context,
            team: input.team,
            institution: input.institution,
            settings,
            sections: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Write a project's full state back, creating the row if it is missing.
    ///
    /// This is the write-through path used after every committing edit.
    pub fn put_project(&self, project: &Project) -> Result<()> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let sections_json = serde_json::to_string(&project.sections)?;

        conn.execute(
            &format!(
                "INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     context = excluded.context,
                     team = excluded.team,
                     institution = excluded.institution,
                     min_sections = excluded.min_sections,
                     max_depth = excluded.max_depth,
                     constrained = excluded.constrained,
                     sections = excluded.sections,
                     updated_at = excluded.updated_at"
            ),
            (
                project.id.to_string(),
                &project.title,
                &project.context,
                &project.team,
                &project.institution,
                project.settings.min_sections,
                project.settings.max_depth as i64,
                if project.settings.constrained { 1 } else { 0 },
                &sections_json,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ),
        )?;

        Ok(())
    }

    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let sections_json: String = row.get(8)?;
    // Lenient read: a corrupted sections column degrades to an empty outline
    // instead of making the whole project unloadable.
    let sections = serde_json::from_str(&sections_json).unwrap_or_default();

    Ok(Project {
        id: parse_uuid(row.get::<_, String>(0)?),
        title: row.get(1)?,
        context: row.get(2)?,
        team: row.get(3)?,
        institution: row.get(4)?,
        settings: GenerationSettings {
            min_sections: row.get(5)?,
            max_depth: row.get::<_, i64>(6)? as usize,
            constrained: row.get::<_, i32>(7)? != 0,
        },
        sections,
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
