/// Course catalog: request validation and administrator CRUD
mod types;

pub use types::*;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::db::{RegistrationDb, UpdateOutcome};
use crate::registration::RegistrationError;
use crate::schedule::{is_valid_time, parse_minutes, Session, Weekday};

/// Course fields as submitted by an administrator.
///
/// Every field is optional at the decoding stage so that missing values are
/// reported as [`RegistrationError::MissingField`] instead of a generic
/// decoding failure. The same type doubles as a partial update for
/// `PUT /admin/courses/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub code: Option<String>,
    pub name: Option<String>,
    /// `None` when the key is absent, `Some(None)` when it is an explicit `null`
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub schedule: Option<Vec<SessionInput>>,
    pub makeup_lectures: Option<Vec<MakeupLectureInput>>,
    pub exception_dates: Option<Vec<String>>,
    pub capacity: Option<i64>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeupLectureInput {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl CourseInput {
    /// Validates the input as a complete course.
    ///
    /// # Returns
    /// * `Ok(NewCourse)` - If every required field is present and well formed
    /// * `Err` - The first validation failure encountered
    pub fn validate(self) -> Result<NewCourse, RegistrationError> {
        let code = required_text(self.code, "code")?;
        let name = required_text(self.name, "name")?;

        let start_date = parse_date(&required_text(self.start_date, "startDate")?)?;
        let end_date = parse_date(&required_text(self.end_date, "endDate")?)?;
        if end_date < start_date {
            return Err(RegistrationError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        let capacity = match self.capacity {
            None => return Err(RegistrationError::MissingField { field: "capacity" }),
            Some(c) if c <= 0 => {
                return Err(RegistrationError::InvalidCapacity {
                    message: format!("capacity must be a positive integer, got {c}"),
                })
            }
            Some(c) => u32::try_from(c).map_err(|_| RegistrationError::InvalidCapacity {
                message: format!("capacity {c} is too large"),
            })?,
        };

        let schedule = self
            .schedule
            .unwrap_or_default()
            .into_iter()
            .map(SessionInput::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let makeup_lectures = self
            .makeup_lectures
            .unwrap_or_default()
            .into_iter()
            .map(MakeupLectureInput::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let mut exception_dates = self
            .exception_dates
            .unwrap_or_default()
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>, _>>()?;
        exception_dates.sort();
        exception_dates.dedup();

        Ok(NewCourse {
            code,
            name,
            description: self.description.flatten().filter(|d| !d.is_empty()),
            start_date,
            end_date,
            schedule,
            makeup_lectures,
            exception_dates,
            capacity,
        })
    }

    /// Fills every field absent from this update with the existing course's value.
    ///
    /// An explicit `"description": null` clears the description.
    pub fn merged_with(self, existing: &Course) -> CourseInput {
        CourseInput {
            code: self.code.or_else(|| Some(existing.code.clone())),
            name: self.name.or_else(|| Some(existing.name.clone())),
            description: self
                .description
                .or_else(|| Some(existing.description.clone())),
            start_date: self
                .start_date
                .or_else(|| Some(existing.start_date.to_string())),
            end_date: self.end_date.or_else(|| Some(existing.end_date.to_string())),
            schedule: self.schedule.or_else(|| {
                Some(existing.schedule.iter().map(SessionInput::from).collect())
            }),
            makeup_lectures: self.makeup_lectures.or_else(|| {
                Some(
                    existing
                        .makeup_lectures
                        .iter()
                        .map(MakeupLectureInput::from)
                        .collect(),
                )
            }),
            exception_dates: self.exception_dates.or_else(|| {
                Some(existing.exception_dates.iter().map(|d| d.to_string()).collect())
            }),
            capacity: self.capacity.or(Some(existing.capacity as i64)),
        }
    }
}

impl SessionInput {
    pub fn validate(self) -> Result<Session, RegistrationError> {
        let day = required_text(self.day, "schedule.day")?;
        let day: Weekday = day
            .parse()
            .map_err(|_| RegistrationError::InvalidScheduleDay { day })?;

        let (start_time, end_time) = validate_time_range(
            required_text(self.start_time, "schedule.startTime")?,
            required_text(self.end_time, "schedule.endTime")?,
        )?;

        Ok(Session {
            day,
            start_time,
            end_time,
        })
    }
}

impl From<&Session> for SessionInput {
    fn from(session: &Session) -> Self {
        Self {
            day: Some(session.day.to_string()),
            start_time: Some(session.start_time.clone()),
            end_time: Some(session.end_time.clone()),
        }
    }
}

impl MakeupLectureInput {
    pub fn validate(self) -> Result<MakeupLecture, RegistrationError> {
        let date = parse_date(&required_text(self.date, "makeupLectures.date")?)?;

        let (start_time, end_time) = validate_time_range(
            required_text(self.start_time, "makeupLectures.startTime")?,
            required_text(self.end_time, "makeupLectures.endTime")?,
        )?;

        Ok(MakeupLecture {
            date,
            start_time,
            end_time,
        })
    }
}

impl From<&MakeupLecture> for MakeupLectureInput {
    fn from(lecture: &MakeupLecture) -> Self {
        Self {
            date: Some(lecture.date.to_string()),
            start_time: Some(lecture.start_time.clone()),
            end_time: Some(lecture.end_time.clone()),
        }
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, RegistrationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(RegistrationError::MissingField { field })
}

/// Checks both times are well formed and that start precedes end.
fn validate_time_range(
    start: String,
    end: String,
) -> Result<(String, String), RegistrationError> {
    for value in [&start, &end] {
        if !is_valid_time(value) {
            return Err(RegistrationError::InvalidTime {
                value: value.clone(),
            });
        }
    }

    match (parse_minutes(&start), parse_minutes(&end)) {
        (Some(s), Some(e)) if s < e => Ok((start, end)),
        _ => Err(RegistrationError::InvalidTimeRange { start, end }),
    }
}

/// Parses a strict `YYYY-MM-DD` date.
fn parse_date(value: &str) -> Result<NaiveDate, RegistrationError> {
    let well_shaped = value.len() == 10
        && value
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });

    well_shaped
        .then(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .flatten()
        .ok_or_else(|| RegistrationError::InvalidDate {
            value: value.to_string(),
        })
}

/// Returns every course in the catalog.
pub fn list_courses(db: &RegistrationDb) -> Result<Vec<Course>, RegistrationError> {
    Ok(db.list_courses()?)
}

/// Validates and stores a new course.
pub fn create_course(db: &RegistrationDb, input: CourseInput) -> Result<Course, RegistrationError> {
    let new_course = input.validate()?;
    let course_id = db.insert_course(&new_course)?;

    info!(course_id, code = %new_course.code, "Created course");

    db.get_course(course_id)?
        .ok_or(RegistrationError::CourseNotFound { course_id })
}

/// Applies a partial update to an existing course.
///
/// The merged course is validated as a whole, and capacity may not drop
/// below the number of students already registered.
pub fn update_course(
    db: &RegistrationDb,
    course_id: i64,
    patch: CourseInput,
) -> Result<Course, RegistrationError> {
    let existing = db
        .get_course(course_id)?
        .ok_or(RegistrationError::CourseNotFound { course_id })?;

    let updated = patch.merged_with(&existing).validate()?;

    // Early check for a clearer message; the store re-checks atomically
    let registered = existing.registered_students.len();
    if (updated.capacity as usize) < registered {
        return Err(capacity_below_registrations(course_id, updated.capacity, registered));
    }

    match db.update_course(course_id, &updated)? {
        UpdateOutcome::Updated => {}
        UpdateOutcome::NotFound => return Err(RegistrationError::CourseNotFound { course_id }),
        UpdateOutcome::BelowRegistrations => {
            let registered = db
                .get_course(course_id)?
                .map(|c| c.registered_students.len())
                .unwrap_or(registered);
            return Err(capacity_below_registrations(course_id, updated.capacity, registered));
        }
    }

    info!(course_id, "Updated course");

    db.get_course(course_id)?
        .ok_or(RegistrationError::CourseNotFound { course_id })
}

fn capacity_below_registrations(
    course_id: i64,
    capacity: u32,
    registered: usize,
) -> RegistrationError {
    warn!(
        course_id,
        capacity,
        registered,
        "Rejected capacity below current registrations"
    );
    RegistrationError::InvalidCapacity {
        message: format!(
            "capacity {capacity} is below the {registered} students already registered"
        ),
    }
}

/// Deletes a course along with its registrations.
pub fn delete_course(db: &RegistrationDb, course_id: i64) -> Result<(), RegistrationError> {
    if !db.delete_course(course_id)? {
        return Err(RegistrationError::CourseNotFound { course_id });
    }

    info!(course_id, "Deleted course");
    Ok(())
}

/// Creates a user account.
pub fn create_student(db: &RegistrationDb, student: NewStudent) -> Result<Student, RegistrationError> {
    if student.name.trim().is_empty() {
        return Err(RegistrationError::MissingField { field: "name" });
    }
    if student.email.trim().is_empty() {
        return Err(RegistrationError::MissingField { field: "email" });
    }

    let id = match db.insert_student(&student) {
        Ok(id) => id,
        Err(e) if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) => {
            return Err(RegistrationError::DuplicateEmail {
                email: student.email,
            })
        }
        Err(e) => return Err(e.into()),
    };

    info!(id, role = %student.role, "Created user");

    db.get_student(id)?
        .ok_or(RegistrationError::StudentNotFound { student_id: id })
}
