use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendanceTotals, Department, DepartmentStats,
    FacultyRecord,
};

/// One decimal place; "0" when there is nothing to divide by.
pub fn rate_string(present: usize, total: usize) -> String {
    if total == 0 {
        "0".to_string()
    } else {
        format!("{:.1}", present as f64 / total as f64 * 100.0)
    }
}

pub fn attendance_totals<'a, I>(records: I) -> AttendanceTotals
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut total = 0;
    let mut present = 0;
    for record in records {
        total += 1;
        if record.status == AttendanceStatus::Present {
            present += 1;
        }
    }

    AttendanceTotals {
        total,
        present,
        absent: total - present,
        rate: rate_string(present, total),
    }
}

pub fn today_summary(records: &[AttendanceRecord], today: NaiveDate) -> AttendanceTotals {
    attendance_totals(records.iter().filter(|r| r.date == today))
}

pub fn department_rollup(
    faculty: &[FacultyRecord],
    attendance: &[AttendanceRecord],
) -> Vec<DepartmentStats> {
    let mut faculty_counts: HashMap<Department, usize> = HashMap::new();
    let mut department_of: HashMap<&str, Department> = HashMap::new();
    for member in faculty {
        *faculty_counts.entry(member.department).or_insert(0) += 1;
        department_of.insert(member.id.as_str(), member.department);
    }

    // Attendance for ids missing from the roster counts toward no department.
    let mut totals: HashMap<Department, (usize, usize)> = HashMap::new();
    for record in attendance {
        if let Some(department) = department_of.get(record.faculty_id.as_str()) {
            let entry = totals.entry(*department).or_insert((0, 0));
            entry.0 += 1;
            if record.status == AttendanceStatus::Present {
                entry.1 += 1;
            }
        }
    }

    let mut rollup: Vec<DepartmentStats> = faculty_counts
        .into_iter()
        .map(|(department, faculty_count)| {
            let (attendance_count, present_count) =
                totals.get(&department).copied().unwrap_or((0, 0));
            DepartmentStats {
                department,
                faculty_count,
                attendance_count,
                present_count,
                average_rate: rate_string(present_count, attendance_count),
            }
        })
        .collect();

    rollup.sort_by(|a, b| a.department.label().cmp(b.department.label()));
    rollup
}

pub fn recent_attendance(records: &[AttendanceRecord], limit: usize) -> &[AttendanceRecord] {
    &records[..limit.min(records.len())]
}
