//! Error types for course management and registration.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while validating courses or changing registrations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistrationError {
    /// A required field was absent or empty
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// A path or body identifier was not a valid record ID
    #[error("Invalid identifier: {value}")]
    InvalidId { value: String },

    /// The request body could not be decoded
    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },

    #[error("Invalid capacity: {message}")]
    InvalidCapacity { message: String },

    /// Day name is not one of Monday..Sunday
    #[error("Invalid schedule day: {day}")]
    InvalidScheduleDay { day: String },

    #[error("Invalid time format '{value}'. Use 'HH:MM AM/PM' or 'HH:MM' (24-hour format).")]
    InvalidTime { value: String },

    #[error("Invalid time range: startTime ({start}) must be before endTime ({end})")]
    InvalidTimeRange { start: String, end: String },

    #[error("Invalid date format '{value}'. Use 'YYYY-MM-DD'.")]
    InvalidDate { value: String },

    #[error("Invalid date range: endDate ({end}) is before startDate ({start})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Course not found: {course_id}")]
    CourseNotFound { course_id: i64 },

    #[error("Student not found: {student_id}")]
    StudentNotFound { student_id: i64 },

    #[error("Course is full")]
    CourseFull { course_id: i64 },

    #[error("Student is already registered for this course")]
    AlreadyRegistered { course_id: i64, student_id: i64 },

    #[error("Student is not registered for this course")]
    NotRegistered { course_id: i64, student_id: i64 },

    /// Email already belongs to another user
    #[error("Email already in use: {email}")]
    DuplicateEmail { email: String },

    /// Storage failure
    #[error("Database error: {message}")]
    Database { message: String },
}

impl RegistrationError {
    /// Returns true if the referenced course or student does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistrationError::CourseNotFound { .. } | RegistrationError::StudentNotFound { .. }
        )
    }

    /// Returns true if the error came from the store rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, RegistrationError::Database { .. })
    }
}

impl From<rusqlite::Error> for RegistrationError {
    fn from(err: rusqlite::Error) -> Self {
        RegistrationError::Database {
            message: err.to_string(),
        }
    }
}
