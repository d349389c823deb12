/// Registration workflow: enrolling students in courses and withdrawing them
mod error;

pub use error::RegistrationError;

use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::{Course, Role, Student};
use crate::db::{InsertOutcome, RegistrationDb};
use crate::schedule::find_conflicts;

/// Body of the register and withdraw requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub student_id: Option<i64>,
    /// Register even if the course clashes with the student's schedule
    #[serde(default)]
    pub confirm: bool,
}

/// What a registration attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// The student now holds a seat in the course.
    Registered { course: Course, student: Student },
    /// Nothing was written; the caller must resubmit with `confirm` set.
    ConflictWarning { conflicting_courses: Vec<Course> },
}

/// Registers a student in a course.
///
/// Checks run in order: student ID present, course exists, student exists,
/// course has a free seat, student not already registered, no schedule
/// conflict (skipped when `confirm` is set). Conflicts are a soft warning,
/// not an error.
pub fn register(
    db: &RegistrationDb,
    course_id: i64,
    request: &RegistrationRequest,
) -> Result<RegistrationOutcome, RegistrationError> {
    let student_id = request
        .student_id
        .ok_or(RegistrationError::MissingField { field: "studentId" })?;

    let course = find_course(db, course_id)?;
    let student = find_student(db, student_id)?;

    if course.is_full() {
        warn!(course_id, student_id, "Registration rejected, course is full");
        return Err(RegistrationError::CourseFull { course_id });
    }

    if course.has_student(student_id) {
        return Err(RegistrationError::AlreadyRegistered {
            course_id,
            student_id,
        });
    }

    if !request.confirm {
        let registered = db.courses_for_student(student_id)?;
        let conflicting_courses: Vec<Course> = find_conflicts(&registered, &course)
            .into_iter()
            .cloned()
            .collect();

        if !conflicting_courses.is_empty() {
            info!(
                course_id,
                student_id,
                conflicts = conflicting_courses.len(),
                "Schedule conflict found, awaiting confirmation"
            );
            return Ok(RegistrationOutcome::ConflictWarning {
                conflicting_courses,
            });
        }
    }

    // The seat may have been taken between the checks above and this insert
    match db.register(course_id, student_id)? {
        InsertOutcome::Inserted => {}
        InsertOutcome::CourseFull => {
            warn!(course_id, student_id, "Course filled up during registration");
            return Err(RegistrationError::CourseFull { course_id });
        }
        InsertOutcome::AlreadyRegistered => {
            return Err(RegistrationError::AlreadyRegistered {
                course_id,
                student_id,
            })
        }
    }

    info!(
        course_id,
        student_id,
        confirmed = request.confirm,
        "Student registered"
    );

    Ok(RegistrationOutcome::Registered {
        course: find_course(db, course_id)?,
        student: find_student(db, student_id)?,
    })
}

/// Withdraws a student from a course.
///
/// # Returns
/// * `Ok((course, student))` - Both records after the withdrawal
/// * `Err` - If either record is missing or the student was not registered
pub fn withdraw(
    db: &RegistrationDb,
    course_id: i64,
    request: &RegistrationRequest,
) -> Result<(Course, Student), RegistrationError> {
    let student_id = request
        .student_id
        .ok_or(RegistrationError::MissingField { field: "studentId" })?;

    find_course(db, course_id)?;
    find_student(db, student_id)?;

    if !db.withdraw(course_id, student_id)? {
        return Err(RegistrationError::NotRegistered {
            course_id,
            student_id,
        });
    }

    info!(course_id, student_id, "Student withdrew");

    Ok((find_course(db, course_id)?, find_student(db, student_id)?))
}

fn find_course(db: &RegistrationDb, course_id: i64) -> Result<Course, RegistrationError> {
    db.get_course(course_id)?
        .ok_or(RegistrationError::CourseNotFound { course_id })
}

/// Looks up a user who may register; admins are treated as unknown students.
fn find_student(db: &RegistrationDb, student_id: i64) -> Result<Student, RegistrationError> {
    db.get_student(student_id)?
        .filter(|s| s.role == Role::Student)
        .ok_or(RegistrationError::StudentNotFound { student_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, CourseInput, NewStudent};
    use serde_json::json;

    struct Fixture {
        db: RegistrationDb,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: RegistrationDb::open_in_memory().unwrap(),
            }
        }

        fn course(&self, code: &str, capacity: i64, schedule: serde_json::Value) -> i64 {
            let input: CourseInput = serde_json::from_value(json!({
                "code": code,
                "name": format!("{code} lecture"),
                "startDate": "2025-01-06",
                "endDate": "2025-04-11",
                "capacity": capacity,
                "schedule": schedule,
            }))
            .unwrap();
            catalog::create_course(&self.db, input).unwrap().id
        }

        fn user(&self, email: &str, role: Role) -> i64 {
            self.db
                .insert_student(&NewStudent {
                    role,
                    name: "Test Student".to_string(),
                    email: email.to_string(),
                })
                .unwrap()
        }

        fn student(&self, email: &str) -> i64 {
            self.user(email, Role::Student)
        }
    }

    fn req(student_id: i64) -> RegistrationRequest {
        RegistrationRequest {
            student_id: Some(student_id),
            confirm: false,
        }
    }

    fn monday_morning() -> serde_json::Value {
        json!([{ "day": "Monday", "startTime": "10:00 AM", "endTime": "12:00 PM" }])
    }

    #[test]
    fn test_register_success() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 10, monday_morning());
        let student_id = f.student("a@example.com");

        match register(&f.db, course_id, &req(student_id)).unwrap() {
            RegistrationOutcome::Registered { course, student } => {
                assert_eq!(course.registered_students, vec![student_id]);
                assert_eq!(course.available_spots, 9);
                assert_eq!(student.registered_courses, vec![course_id]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_register_missing_student_id() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 10, monday_morning());

        assert_eq!(
            register(&f.db, course_id, &RegistrationRequest::default()),
            Err(RegistrationError::MissingField { field: "studentId" })
        );
    }

    #[test]
    fn test_register_not_found() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 10, monday_morning());
        let student_id = f.student("a@example.com");
        let admin_id = f.user("admin@example.com", Role::Admin);

        assert_eq!(
            register(&f.db, course_id + 100, &req(student_id)),
            Err(RegistrationError::CourseNotFound {
                course_id: course_id + 100
            })
        );
        assert_eq!(
            register(&f.db, course_id, &req(student_id + 100)),
            Err(RegistrationError::StudentNotFound {
                student_id: student_id + 100
            })
        );
        assert_eq!(
            register(&f.db, course_id, &req(admin_id)),
            Err(RegistrationError::StudentNotFound {
                student_id: admin_id
            })
        );
    }

    #[test]
    fn test_register_full_course_does_not_mutate() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 1, monday_morning());
        let first = f.student("a@example.com");
        let second = f.student("b@example.com");

        register(&f.db, course_id, &req(first)).unwrap();
        assert_eq!(
            register(&f.db, course_id, &req(second)),
            Err(RegistrationError::CourseFull { course_id })
        );

        let course = f.db.get_course(course_id).unwrap().unwrap();
        assert_eq!(course.registered_students, vec![first]);
        assert!(f.db.get_student(second).unwrap().unwrap().registered_courses.is_empty());
    }

    #[test]
    fn test_register_twice() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 10, monday_morning());
        let student_id = f.student("a@example.com");

        register(&f.db, course_id, &req(student_id)).unwrap();
        assert_eq!(
            register(&f.db, course_id, &req(student_id)),
            Err(RegistrationError::AlreadyRegistered {
                course_id,
                student_id
            })
        );
    }

    #[test]
    fn test_conflict_warns_then_confirm_registers() {
        let f = Fixture::new();
        let first = f.course("ECE 1786", 10, monday_morning());
        let clashing = f.course(
            "CSC 2515",
            10,
            json!([{ "day": "Monday", "startTime": "11:00 AM", "endTime": "1:00 PM" }]),
        );
        let student_id = f.student("a@example.com");
        register(&f.db, first, &req(student_id)).unwrap();

        match register(&f.db, clashing, &req(student_id)).unwrap() {
            RegistrationOutcome::ConflictWarning {
                conflicting_courses,
            } => {
                let ids: Vec<i64> = conflicting_courses.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![first]);
            }
            other => panic!("expected a conflict warning, got {other:?}"),
        }
        assert!(!f
            .db
            .get_course(clashing)
            .unwrap()
            .unwrap()
            .has_student(student_id));

        let confirmed = RegistrationRequest {
            student_id: Some(student_id),
            confirm: true,
        };
        assert!(matches!(
            register(&f.db, clashing, &confirmed).unwrap(),
            RegistrationOutcome::Registered { .. }
        ));
    }

    #[test]
    fn test_back_to_back_courses_do_not_conflict() {
        let f = Fixture::new();
        let first = f.course("ECE 1786", 10, monday_morning());
        let next = f.course(
            "CSC 2515",
            10,
            json!([{ "day": "Monday", "startTime": "12:00 PM", "endTime": "1:00 PM" }]),
        );
        let student_id = f.student("a@example.com");

        register(&f.db, first, &req(student_id)).unwrap();
        assert!(matches!(
            register(&f.db, next, &req(student_id)).unwrap(),
            RegistrationOutcome::Registered { .. }
        ));
    }

    #[test]
    fn test_withdraw() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 10, monday_morning());
        let student_id = f.student("a@example.com");
        register(&f.db, course_id, &req(student_id)).unwrap();

        let (course, student) = withdraw(&f.db, course_id, &req(student_id)).unwrap();
        assert!(course.registered_students.is_empty());
        assert_eq!(course.available_spots, 10);
        assert!(student.registered_courses.is_empty());
    }

    #[test]
    fn test_withdraw_not_registered_leaves_records_unchanged() {
        let f = Fixture::new();
        let course_id = f.course("ECE 1786", 10, monday_morning());
        let other_course = f.course("CSC 2515", 10, json!([]));
        let registered = f.student("a@example.com");
        let bystander = f.student("b@example.com");
        register(&f.db, course_id, &req(registered)).unwrap();
        register(&f.db, other_course, &req(bystander)).unwrap();

        let course_before = f.db.get_course(course_id).unwrap();
        let student_before = f.db.get_student(bystander).unwrap();

        assert_eq!(
            withdraw(&f.db, course_id, &req(bystander)),
            Err(RegistrationError::NotRegistered {
                course_id,
                student_id: bystander
            })
        );
        assert_eq!(f.db.get_course(course_id).unwrap(), course_before);
        assert_eq!(f.db.get_student(bystander).unwrap(), student_before);
    }
}
