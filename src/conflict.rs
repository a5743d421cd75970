use crate::models::{ConflictEntry, ConflictKind, ScheduleRecord};

/// Checks every unordered pair once, in catalog order. Quadratic, which is
/// fine for a catalog of tens of entries but not for a campus-wide timetable.
pub fn detect_conflicts(schedules: &[ScheduleRecord]) -> Vec<ConflictEntry> {
    let mut conflicts = Vec::new();

    for i in 0..schedules.len() {
        for j in (i + 1)..schedules.len() {
            let first = &schedules[i];
            let second = &schedules[j];
            if first.day != second.day || !intervals_overlap(first, second) {
                continue;
            }

            if first.classroom == second.classroom {
                conflicts.push(ConflictEntry {
                    kind: ConflictKind::Classroom,
                    first: first.clone(),
                    second: second.clone(),
                    message: format!(
                        "Classroom conflict: {} and {}",
                        first.subject, second.subject
                    ),
                });
            }

            if first.faculty_id == second.faculty_id {
                conflicts.push(ConflictEntry {
                    kind: ConflictKind::Faculty,
                    first: first.clone(),
                    second: second.clone(),
                    message: format!(
                        "Faculty conflict: {} and {}",
                        first.subject, second.subject
                    ),
                });
            }
        }
    }

    conflicts
}

/// Strict comparison on both ends, so back-to-back slots sharing a boundary
/// minute do not overlap.
fn intervals_overlap(a: &ScheduleRecord, b: &ScheduleRecord) -> bool {
    a.start_time < b.end_time && b.start_time < a.end_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassDay;
    use chrono::NaiveTime;

    fn slot(
        id: &str,
        faculty_id: &str,
        classroom: &str,
        day: ClassDay,
        start: (u32, u32),
        end: (u32, u32),
    ) -> ScheduleRecord {
        ScheduleRecord {
            id: id.to_string(),
            faculty_id: faculty_id.to_string(),
            subject: format!("Subject {id}"),
            classroom: classroom.to_string(),
            day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            capacity: 40,
        }
    }

    #[test]
    fn overlapping_same_room_reports_classroom_conflict() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (10, 30)),
            slot("SCH002", "FAC002", "CS-101", ClassDay::Monday, (10, 0), (11, 30)),
        ];

        let conflicts = detect_conflicts(&schedules);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Classroom);
        assert_eq!(
            conflicts[0].message,
            "Classroom conflict: Subject SCH001 and Subject SCH002"
        );
    }

    #[test]
    fn touching_slots_do_not_conflict() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (10, 30)),
            slot("SCH002", "FAC001", "CS-101", ClassDay::Monday, (10, 30), (12, 0)),
        ];

        assert!(detect_conflicts(&schedules).is_empty());
    }

    #[test]
    fn different_days_never_conflict() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (10, 30)),
            slot("SCH002", "FAC001", "CS-101", ClassDay::Tuesday, (9, 0), (10, 30)),
        ];

        assert!(detect_conflicts(&schedules).is_empty());
    }

    #[test]
    fn same_faculty_in_different_rooms_reports_faculty_conflict() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (10, 30)),
            slot("SCH002", "FAC001", "CS-202", ClassDay::Monday, (10, 0), (11, 30)),
        ];

        let conflicts = detect_conflicts(&schedules);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Faculty);
    }

    #[test]
    fn same_room_and_faculty_reports_both_kinds() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (10, 30)),
            slot("SCH002", "FAC001", "CS-101", ClassDay::Monday, (10, 0), (11, 30)),
        ];

        let conflicts = detect_conflicts(&schedules);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].kind, ConflictKind::Classroom);
        assert_eq!(conflicts[1].kind, ConflictKind::Faculty);
    }

    #[test]
    fn containment_counts_as_overlap() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (12, 0)),
            slot("SCH002", "FAC002", "CS-101", ClassDay::Monday, (10, 0), (11, 0)),
        ];

        assert_eq!(detect_conflicts(&schedules).len(), 1);
    }

    #[test]
    fn pairs_are_scanned_in_catalog_order() {
        let schedules = vec![
            slot("SCH001", "FAC001", "CS-101", ClassDay::Monday, (9, 0), (10, 0)),
            slot("SCH002", "FAC002", "CS-101", ClassDay::Monday, (9, 30), (10, 30)),
            slot("SCH003", "FAC003", "CS-101", ClassDay::Monday, (9, 45), (10, 45)),
        ];

        let conflicts = detect_conflicts(&schedules);
        let pairs: Vec<(&str, &str)> = conflicts
            .iter()
            .map(|c| (c.first.id.as_str(), c.second.id.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("SCH001", "SCH002"),
                ("SCH001", "SCH003"),
                ("SCH002", "SCH003"),
            ]
        );
    }

    #[test]
    fn seeded_catalog_is_conflict_free() {
        let schedules = crate::store::seed_schedules().unwrap();
        assert!(detect_conflicts(&schedules).is_empty());
    }
}
