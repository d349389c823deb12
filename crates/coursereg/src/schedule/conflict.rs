use super::{parse_minutes, Session};
use crate::catalog::Course;
use tracing::debug;

/// Checks whether two time windows on the same day intersect.
///
/// Windows are half-open, so a class ending at 12:00 PM does not collide
/// with one starting at 12:00 PM. If any of the four times fails to parse,
/// the windows are reported as not overlapping.
pub fn windows_overlap(start1: &str, end1: &str, start2: &str, end2: &str) -> bool {
    let (Some(s1), Some(e1), Some(s2), Some(e2)) = (
        parse_minutes(start1),
        parse_minutes(end1),
        parse_minutes(start2),
        parse_minutes(end2),
    ) else {
        debug!(start1, end1, start2, end2, "Unparsable session time, treating as no overlap");
        return false;
    };

    s1 < e2 && s2 < e1
}

/// Checks whether two sessions fall on the same weekday and overlap in time.
pub fn sessions_overlap(a: &Session, b: &Session) -> bool {
    a.day == b.day && windows_overlap(&a.start_time, &a.end_time, &b.start_time, &b.end_time)
}

/// Finds every registered course whose weekly schedule collides with the
/// candidate's.
///
/// Each registered course appears at most once, in input order. Make-up
/// lectures are not considered.
pub fn find_conflicts<'a>(registered: &'a [Course], candidate: &Course) -> Vec<&'a Course> {
    registered
        .iter()
        .filter(|course| course.id != candidate.id)
        .filter(|course| {
            course.schedule.iter().any(|session| {
                candidate
                    .schedule
                    .iter()
                    .any(|other| sessions_overlap(session, other))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Course;
    use crate::schedule::Weekday;

    fn course(id: i64, schedule: Vec<Session>) -> Course {
        Course {
            id,
            code: format!("ECE {id}"),
            name: format!("Course {id}"),
            schedule,
            capacity: 30,
            ..Course::default()
        }
    }

    #[test]
    fn test_overlapping_windows() {
        let a = Session::new(Weekday::Monday, "10:00 AM", "12:00 PM");
        let b = Session::new(Weekday::Monday, "11:00 AM", "1:00 PM");
        assert!(sessions_overlap(&a, &b));
        assert!(sessions_overlap(&b, &a));
    }

    #[test]
    fn test_touching_boundary_does_not_overlap() {
        let a = Session::new(Weekday::Monday, "10:00 AM", "12:00 PM");
        let b = Session::new(Weekday::Monday, "12:00 PM", "1:00 PM");
        assert!(!sessions_overlap(&a, &b));
        assert!(!sessions_overlap(&b, &a));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let times = [
            ("8:00 AM", "9:00 AM"),
            ("8:30", "10:00"),
            ("9:00 AM", "9:30 AM"),
            ("12:00 AM", "11:59 PM"),
            ("1:00 PM", "2:00 PM"),
            ("bogus", "2:00 PM"),
        ];

        for (s1, e1) in times {
            for (s2, e2) in times {
                assert_eq!(
                    windows_overlap(s1, e1, s2, e2),
                    windows_overlap(s2, e2, s1, e1),
                    "{s1}-{e1} vs {s2}-{e2}"
                );
            }
        }
    }

    #[test]
    fn test_mixed_clock_formats() {
        assert!(windows_overlap("2:00 PM", "3:00 PM", "14:30", "15:30"));
        assert!(!windows_overlap("2:00 PM", "3:00 PM", "15:00", "16:00"));
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(windows_overlap("9:00 AM", "5:00 PM", "11:00 AM", "12:00 PM"));
    }

    #[test]
    fn test_different_days_never_overlap() {
        let a = Session::new(Weekday::Monday, "10:00 AM", "12:00 PM");
        let b = Session::new(Weekday::Tuesday, "10:00 AM", "12:00 PM");
        assert!(!sessions_overlap(&a, &b));
    }

    #[test]
    fn test_unparsable_time_fails_open() {
        assert!(!windows_overlap("10:00 AM", "noon", "11:00 AM", "1:00 PM"));
    }

    #[test]
    fn test_no_shared_weekday_yields_no_conflicts() {
        let registered = vec![
            course(1, vec![Session::new(Weekday::Monday, "9:00 AM", "11:00 AM")]),
            course(2, vec![Session::new(Weekday::Wednesday, "9:00 AM", "11:00 AM")]),
        ];
        let candidate = course(3, vec![Session::new(Weekday::Tuesday, "9:00 AM", "11:00 AM")]);

        assert!(find_conflicts(&registered, &candidate).is_empty());
    }

    #[test]
    fn test_conflicting_course_reported_once() {
        let registered = vec![
            course(
                1,
                vec![
                    Session::new(Weekday::Monday, "9:00 AM", "11:00 AM"),
                    Session::new(Weekday::Wednesday, "9:00 AM", "11:00 AM"),
                ],
            ),
            course(2, vec![Session::new(Weekday::Friday, "1:00 PM", "2:00 PM")]),
            course(4, vec![Session::new(Weekday::Wednesday, "10:30", "11:30")]),
        ];
        let candidate = course(
            3,
            vec![
                Session::new(Weekday::Monday, "10:00 AM", "12:00 PM"),
                Session::new(Weekday::Wednesday, "10:00 AM", "12:00 PM"),
            ],
        );

        let conflicts: Vec<i64> = find_conflicts(&registered, &candidate)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(conflicts, vec![1, 4]);
    }
}
