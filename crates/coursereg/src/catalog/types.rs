/// Types for course and student records
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::schedule::Session;

/// A course as exposed over the API.
///
/// `registered_students` is derived from the registrations table, so it
/// always agrees with the matching students' `registered_courses`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule: Vec<Session>,
    pub makeup_lectures: Vec<MakeupLecture>,
    pub exception_dates: Vec<NaiveDate>,
    pub capacity: u32,
    pub registered_students: Vec<i64>,
    pub available_spots: u32,
}

impl Course {
    pub fn is_full(&self) -> bool {
        self.registered_students.len() >= self.capacity as usize
    }

    pub fn has_student(&self, student_id: i64) -> bool {
        self.registered_students.contains(&student_id)
    }
}

/// An extra one-off session outside the weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeupLecture {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

/// A validated course ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule: Vec<Session>,
    pub makeup_lectures: Vec<MakeupLecture>,
    pub exception_dates: Vec<NaiveDate>,
    pub capacity: u32,
}

impl From<&Course> for NewCourse {
    fn from(course: &Course) -> Self {
        Self {
            code: course.code.clone(),
            name: course.name.clone(),
            description: course.description.clone(),
            start_date: course.start_date,
            end_date: course.end_date,
            schedule: course.schedule.clone(),
            makeup_lectures: course.makeup_lectures.clone(),
            exception_dates: course.exception_dates.clone(),
            capacity: course.capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user account. Only users with [`Role::Student`] can register for courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub registered_courses: Vec<i64>,
}

/// A user to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub role: Role,
    pub name: String,
    pub email: String,
}
