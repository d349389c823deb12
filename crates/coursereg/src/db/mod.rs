/// Database module for courses, students and registrations

mod types;

pub use types::{DbCourse, DbUser, InsertOutcome, UpdateOutcome};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::catalog::{Course, MakeupLecture, NewCourse, NewStudent, Student};
use crate::schedule::Session;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_registration.sql");

const COURSE_COLUMNS: &str =
    "course_id, code, name, description, start_date, end_date, capacity";

pub struct RegistrationDb {
    db: Mutex<Connection>,
}

impl RegistrationDb {
    /// Opens (or creates) the database file and initializes the schema
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        debug!("Opening database at {}", db_path.display());

        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Self::init(conn)?;
        info!("Database ready at {}", db_path.display());
        Ok(db)
    }

    /// Creates an in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a trivial query to confirm the connection is usable
    pub fn ping(&self) -> Result<()> {
        self.conn().query_row("SELECT 1", [], |_| Ok(()))
    }

    /// Inserts a course with its sessions, make-up lectures and exception dates
    pub fn insert_course(&self, course: &NewCourse) -> Result<i64> {
        let mut db = self.conn();
        let tx = db.transaction()?;
        let now = Utc::now();

        tx.execute(
            "INSERT INTO courses (code, name, description, start_date, end_date, capacity, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                course.code,
                course.name,
                course.description,
                course.start_date,
                course.end_date,
                course.capacity,
                now,
            ],
        )?;
        let course_id = tx.last_insert_rowid();

        insert_course_children(&tx, course_id, course)?;
        tx.commit()?;

        Ok(course_id)
    }

    /// Replaces every field of a course. Registrations are left untouched.
    ///
    /// The registration count is checked against the new capacity in the
    /// same statement as the write, so a concurrent registration cannot
    /// leave the course over capacity.
    pub fn update_course(&self, course_id: i64, course: &NewCourse) -> Result<UpdateOutcome> {
        let mut db = self.conn();
        let tx = db.transaction()?;

        let updated = tx.execute(
            "UPDATE courses
             SET code = ?2, name = ?3, description = ?4, start_date = ?5, end_date = ?6,
                 capacity = ?7, updated_at = ?8
             WHERE course_id = ?1
               AND (SELECT COUNT(*) FROM registrations WHERE course_id = ?1) <= ?7",
            params![
                course_id,
                course.code,
                course.name,
                course.description,
                course.start_date,
                course.end_date,
                course.capacity,
                Utc::now(),
            ],
        )?;
        if updated == 0 {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM courses WHERE course_id = ?1)",
                [course_id],
                |r| r.get(0),
            )?;
            return Ok(if exists {
                UpdateOutcome::BelowRegistrations
            } else {
                UpdateOutcome::NotFound
            });
        }

        for table in ["course_sessions", "makeup_lectures", "exception_dates"] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE course_id = ?1"),
                [course_id],
            )?;
        }
        insert_course_children(&tx, course_id, course)?;
        tx.commit()?;

        Ok(UpdateOutcome::Updated)
    }

    /// Deletes a course. Sessions and registrations go with it.
    ///
    /// Returns false if no course has the given ID.
    pub fn delete_course(&self, course_id: i64) -> Result<bool> {
        let db = self.conn();
        let deleted = db.execute("DELETE FROM courses WHERE course_id = ?1", [course_id])?;
        Ok(deleted > 0)
    }

    /// Gets a course by ID
    pub fn get_course(&self, course_id: i64) -> Result<Option<Course>> {
        let db = self.conn();
        let row = db
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = ?1"),
                [course_id],
                map_course_row,
            )
            .optional()?;

        row.map(|row| load_course(&db, row)).transpose()
    }

    /// Gets all courses, ordered by ID
    pub fn list_courses(&self) -> Result<Vec<Course>> {
        let db = self.conn();
        let mut stmt = db.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_id"
        ))?;
        let rows = stmt
            .query_map([], map_course_row)?
            .collect::<Result<Vec<_>>>()?;

        rows.into_iter().map(|row| load_course(&db, row)).collect()
    }

    /// Gets every course the given user is registered in, ordered by ID
    pub fn courses_for_student(&self, user_id: i64) -> Result<Vec<Course>> {
        let db = self.conn();
        let mut stmt = db.prepare(
            "SELECT c.course_id, c.code, c.name, c.description, c.start_date, c.end_date, c.capacity
             FROM courses c
             JOIN registrations r ON r.course_id = c.course_id
             WHERE r.user_id = ?1
             ORDER BY c.course_id",
        )?;
        let rows = stmt
            .query_map([user_id], map_course_row)?
            .collect::<Result<Vec<_>>>()?;

        rows.into_iter().map(|row| load_course(&db, row)).collect()
    }

    /// Inserts a user. Fails with a constraint violation if the email is taken.
    pub fn insert_student(&self, student: &NewStudent) -> Result<i64> {
        let db = self.conn();
        db.execute(
            "INSERT INTO users (role, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![student.role, student.name, student.email, Utc::now()],
        )?;
        Ok(db.last_insert_rowid())
    }

    /// Gets a user by ID along with their registered course IDs
    pub fn get_student(&self, user_id: i64) -> Result<Option<Student>> {
        let db = self.conn();
        let user = db
            .query_row(
                "SELECT user_id, role, name, email FROM users WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(DbUser {
                        user_id: row.get(0)?,
                        role: row.get(1)?,
                        name: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()?;

        let Some(user) = user else {
            return Ok(None);
        };

        let registered_courses = query_ids(
            &db,
            "SELECT course_id FROM registrations WHERE user_id = ?1 ORDER BY course_id",
            user.user_id,
        )?;

        Ok(Some(Student {
            id: user.user_id,
            role: user.role,
            name: user.name,
            email: user.email,
            registered_courses,
        }))
    }

    /// Registers a user in a course if, and only if, a seat is free.
    ///
    /// The seat check and the insert are one statement, so concurrent
    /// requests cannot push a course past its capacity.
    pub fn register(&self, course_id: i64, user_id: i64) -> Result<InsertOutcome> {
        let mut db = self.conn();
        let tx = db.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO registrations (course_id, user_id, registered_at)
             SELECT ?1, ?2, ?3
             WHERE (SELECT COUNT(*) FROM registrations WHERE course_id = ?1)
                 < (SELECT capacity FROM courses WHERE course_id = ?1)",
            params![course_id, user_id, Utc::now()],
        )?;

        let outcome = if inserted > 0 {
            InsertOutcome::Inserted
        } else if is_registered(&tx, course_id, user_id)? {
            InsertOutcome::AlreadyRegistered
        } else {
            InsertOutcome::CourseFull
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// Removes a registration. Returns false if there was none.
    pub fn withdraw(&self, course_id: i64, user_id: i64) -> Result<bool> {
        let db = self.conn();
        let deleted = db.execute(
            "DELETE FROM registrations WHERE course_id = ?1 AND user_id = ?2",
            [course_id, user_id],
        )?;
        Ok(deleted > 0)
    }
}

fn map_course_row(row: &rusqlite::Row<'_>) -> Result<DbCourse> {
    Ok(DbCourse {
        course_id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        capacity: row.get(6)?,
    })
}

fn insert_course_children(tx: &Transaction<'_>, course_id: i64, course: &NewCourse) -> Result<()> {
    for (position, session) in course.schedule.iter().enumerate() {
        tx.execute(
            "INSERT INTO course_sessions (course_id, position, day, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                course_id,
                position as i64,
                session.day,
                session.start_time,
                session.end_time,
            ],
        )?;
    }

    for (position, lecture) in course.makeup_lectures.iter().enumerate() {
        tx.execute(
            "INSERT INTO makeup_lectures (course_id, position, date, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                course_id,
                position as i64,
                lecture.date,
                lecture.start_time,
                lecture.end_time,
            ],
        )?;
    }

    for date in &course.exception_dates {
        tx.execute(
            "INSERT OR IGNORE INTO exception_dates (course_id, date) VALUES (?1, ?2)",
            params![course_id, date],
        )?;
    }

    Ok(())
}

/// Assembles a full course from its row and child tables
fn load_course(db: &Connection, row: DbCourse) -> Result<Course> {
    let mut stmt = db.prepare(
        "SELECT day, start_time, end_time FROM course_sessions
         WHERE course_id = ?1 ORDER BY position",
    )?;
    let schedule = stmt
        .query_map([row.course_id], |r| {
            Ok(Session {
                day: r.get(0)?,
                start_time: r.get(1)?,
                end_time: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    let mut stmt = db.prepare(
        "SELECT date, start_time, end_time FROM makeup_lectures
         WHERE course_id = ?1 ORDER BY position",
    )?;
    let makeup_lectures = stmt
        .query_map([row.course_id], |r| {
            Ok(MakeupLecture {
                date: r.get(0)?,
                start_time: r.get(1)?,
                end_time: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    let mut stmt =
        db.prepare("SELECT date FROM exception_dates WHERE course_id = ?1 ORDER BY date")?;
    let exception_dates = stmt
        .query_map([row.course_id], |r| r.get(0))?
        .collect::<Result<Vec<_>>>()?;

    let registered_students = query_ids(
        db,
        "SELECT user_id FROM registrations WHERE course_id = ?1 ORDER BY registered_at, user_id",
        row.course_id,
    )?;
    let available_spots = row
        .capacity
        .saturating_sub(registered_students.len() as u32);

    Ok(Course {
        id: row.course_id,
        code: row.code,
        name: row.name,
        description: row.description,
        start_date: row.start_date,
        end_date: row.end_date,
        schedule,
        makeup_lectures,
        exception_dates,
        capacity: row.capacity,
        registered_students,
        available_spots,
    })
}

fn query_ids(db: &Connection, sql: &str, key: i64) -> Result<Vec<i64>> {
    let mut stmt = db.prepare(sql)?;
    let ids = stmt.query_map([key], |r| r.get(0))?.collect();
    ids
}

fn is_registered(db: &Connection, course_id: i64, user_id: i64) -> Result<bool> {
    db.query_row(
        "SELECT EXISTS(SELECT 1 FROM registrations WHERE course_id = ?1 AND user_id = ?2)",
        [course_id, user_id],
        |r| r.get(0),
    )
}
