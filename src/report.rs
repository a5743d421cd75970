use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{AttendanceRecord, AttendanceStatus, Department, FacultyRecord};
use crate::stats;

pub const CSV_HEADERS: [&str; 10] = [
    "Date",
    "Faculty ID",
    "Name",
    "Department",
    "Subject",
    "Classroom",
    "Status",
    "Time",
    "Method",
    "Confidence",
];

#[derive(Debug, Default, Clone)]
pub struct ReportFilters {
    pub faculty_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub subject: Option<String>,
    pub department: Option<Department>,
    pub status: Option<AttendanceStatus>,
}

impl ReportFilters {
    /// Every set filter must match; unset filters pass everything through.
    pub fn apply(
        &self,
        records: &[AttendanceRecord],
        faculty: &[FacultyRecord],
    ) -> Vec<AttendanceRecord> {
        let department_members: HashSet<&str> = match self.department {
            Some(department) => faculty
                .iter()
                .filter(|f| f.department == department)
                .map(|f| f.id.as_str())
                .collect(),
            None => HashSet::new(),
        };

        records
            .iter()
            .filter(|record| {
                self.faculty_id
                    .as_deref()
                    .map_or(true, |id| record.faculty_id == id)
                    && self.date.map_or(true, |date| record.date == date)
                    && self
                        .subject
                        .as_deref()
                        .map_or(true, |subject| record.subject == subject)
                    && self.department.map_or(true, |_| {
                        department_members.contains(record.faculty_id.as_str())
                    })
                    && self.status.map_or(true, |status| record.status == status)
            })
            .cloned()
            .collect()
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = &self.faculty_id {
            parts.push(format!("faculty {id}"));
        }
        if let Some(date) = self.date {
            parts.push(format!("date {date}"));
        }
        if let Some(subject) = &self.subject {
            parts.push(format!("subject {subject}"));
        }
        if let Some(department) = self.department {
            parts.push(format!("department {}", department.label()));
        }
        if let Some(status) = self.status {
            parts.push(format!("status {}", status.as_str()));
        }

        if parts.is_empty() {
            "all records".to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub fn build_report(
    filters: &ReportFilters,
    records: &[AttendanceRecord],
    limit: usize,
) -> String {
    let totals = stats::attendance_totals(records);

    let mut output = String::new();
    let _ = writeln!(output, "# Faculty Attendance Report");
    let _ = writeln!(output, "Scope: {}", filters.describe());
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{} records: {} present, {} absent (rate {}%)",
        totals.total, totals.present, totals.absent, totals.rate
    );
    let _ = writeln!(output);

    if records.is_empty() {
        let _ = writeln!(output, "No attendance records match this scope.");
    } else {
        for record in records.iter().take(limit) {
            let confidence = record
                .confidence
                .map_or_else(|| "N/A".to_string(), |c| format!("{c:.1}%"));
            let _ = writeln!(
                output,
                "- {} {} {} ({}): {} in {} [{}, confidence {}]",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.status.as_str(),
                record.faculty_name,
                record.faculty_id,
                record.subject,
                record.classroom,
                record.method.as_str(),
                confidence
            );
        }
        if records.len() > limit {
            let _ = writeln!(output, "... and {} more", records.len() - limit);
        }
    }

    output
}

pub fn write_csv<W: std::io::Write>(
    writer: W,
    records: &[AttendanceRecord],
    faculty: &[FacultyRecord],
) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADERS)?;

    // Department comes from the roster; ids with no roster entry export blank.
    let departments: HashMap<&str, &str> = faculty
        .iter()
        .map(|f| (f.id.as_str(), f.department.label()))
        .collect();

    for record in records {
        let confidence = record
            .confidence
            .map_or_else(|| "N/A".to_string(), |c| format!("{c:.1}"));
        csv_writer.write_record([
            record.timestamp.format("%Y-%m-%d").to_string(),
            record.faculty_id.clone(),
            record.faculty_name.clone(),
            departments
                .get(record.faculty_id.as_str())
                .copied()
                .unwrap_or("")
                .to_string(),
            record.subject.clone(),
            record.classroom.clone(),
            record.status.as_str().to_string(),
            record.timestamp.format("%H:%M:%S").to_string(),
            record.method.as_str().to_string(),
            confidence,
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaptureMethod;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn member(id: &str, name: &str, department: Department) -> FacultyRecord {
        FacultyRecord {
            id: id.to_string(),
            name: name.to_string(),
            department,
            subject: "Sample Subject".to_string(),
            email: "sample@college.edu".to_string(),
            phone: "+1-555-0100".to_string(),
            office: "Room 100".to_string(),
            join_date: day(1),
            attendance_rate: 90.0,
        }
    }

    fn record(
        faculty_id: &str,
        name: &str,
        subject: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("ATT_{faculty_id}_{date}"),
            faculty_id: faculty_id.to_string(),
            faculty_name: name.to_string(),
            subject: subject.to_string(),
            classroom: "CS-101".to_string(),
            date,
            timestamp: date
                .and_time(NaiveTime::from_hms_opt(9, 15, 0).unwrap())
                .and_utc(),
            status,
            method: match status {
                AttendanceStatus::Present => CaptureMethod::FaceRecognition,
                AttendanceStatus::Absent => CaptureMethod::Manual,
            },
            confidence: match status {
                AttendanceStatus::Present => Some(92.3),
                AttendanceStatus::Absent => None,
            },
        }
    }

    #[test]
    fn filters_apply_conjunctively() {
        let records = vec![
            record(
                "FAC001",
                "Dr. A",
                "Algorithms",
                day(2),
                AttendanceStatus::Present,
            ),
            record(
                "FAC001",
                "Dr. A",
                "Algorithms",
                day(3),
                AttendanceStatus::Absent,
            ),
            record(
                "FAC002",
                "Dr. B",
                "Circuits",
                day(2),
                AttendanceStatus::Present,
            ),
        ];

        let filters = ReportFilters {
            faculty_id: Some("FAC001".to_string()),
            status: Some(AttendanceStatus::Present),
            ..ReportFilters::default()
        };
        let matched = filters.apply(&records, &[]);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].faculty_id, "FAC001");
        assert_eq!(matched[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn no_filters_pass_everything_through() {
        let records = vec![
            record(
                "FAC001",
                "Dr. A",
                "Algorithms",
                day(2),
                AttendanceStatus::Present,
            ),
            record(
                "FAC002",
                "Dr. B",
                "Circuits",
                day(2),
                AttendanceStatus::Absent,
            ),
        ];

        let matched = ReportFilters::default().apply(&records, &[]);
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn department_filter_resolves_through_the_roster() {
        let faculty = vec![
            member("FAC001", "Dr. A", Department::ComputerScience),
            member("FAC002", "Dr. B", Department::Physics),
        ];
        let records = vec![
            record(
                "FAC001",
                "Dr. A",
                "Algorithms",
                day(2),
                AttendanceStatus::Present,
            ),
            record(
                "FAC002",
                "Dr. B",
                "Mechanics",
                day(2),
                AttendanceStatus::Present,
            ),
        ];

        let filters = ReportFilters {
            department: Some(Department::Physics),
            ..ReportFilters::default()
        };
        let matched = filters.apply(&records, &faculty);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].faculty_id, "FAC002");
    }

    #[test]
    fn describe_names_each_active_filter() {
        assert_eq!(ReportFilters::default().describe(), "all records");

        let filters = ReportFilters {
            department: Some(Department::Chemistry),
            status: Some(AttendanceStatus::Absent),
            ..ReportFilters::default()
        };
        assert_eq!(filters.describe(), "department Chemistry, status absent");
    }

    #[test]
    fn report_counts_and_truncates_rows() {
        let records = vec![
            record(
                "FAC001",
                "Dr. A",
                "Algorithms",
                day(2),
                AttendanceStatus::Present,
            ),
            record(
                "FAC002",
                "Dr. B",
                "Circuits",
                day(2),
                AttendanceStatus::Absent,
            ),
        ];

        let text = build_report(&ReportFilters::default(), &records, 1);
        assert!(text.contains("2 records: 1 present, 1 absent (rate 50.0%)"));
        assert!(text.contains("Dr. A"));
        assert!(!text.contains("Dr. B"));
        assert!(text.contains("... and 1 more"));
    }

    #[test]
    fn empty_report_notes_the_empty_scope() {
        let text = build_report(&ReportFilters::default(), &[], 10);
        assert!(text.contains("0 records"));
        assert!(text.contains("No attendance records match this scope."));
    }

    #[test]
    fn csv_starts_with_the_header_row() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[], &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "Date,Faculty ID,Name,Department,Subject,Classroom,Status,Time,Method,Confidence"
        );
    }

    #[test]
    fn csv_quotes_fields_containing_commas() {
        let faculty = vec![member("FAC001", "Johnson, Sarah", Department::ComputerScience)];
        let records = vec![record(
            "FAC001",
            "Johnson, Sarah",
            "Algorithms",
            day(2),
            AttendanceStatus::Present,
        )];

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &records, &faculty).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains("\"Johnson, Sarah\""));
        assert!(row.contains("Computer Science"));
        assert!(row.contains("92.3"));
        assert!(row.contains("09:15:00"));
    }

    #[test]
    fn csv_fills_gaps_with_placeholders() {
        let records = vec![record(
            "FAC999",
            "Dr. Nobody",
            "Mystery",
            day(2),
            AttendanceStatus::Absent,
        )];

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &records, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let row = text.lines().nth(1).unwrap();
        // No roster match leaves the department column empty.
        assert!(row.contains("FAC999,Dr. Nobody,,Mystery"));
        assert!(row.ends_with("manual,N/A"));
    }
}
