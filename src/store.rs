use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use rand::Rng;
use tokio::time::sleep;

use crate::models::{
    AttendanceRecord, AttendanceStatus, CaptureMethod, ClassDay, Department, FacultyRecord,
    ScheduleRecord,
};

/// Window covers today plus the 29 days before it.
pub const ATTENDANCE_WINDOW_DAYS: i64 = 30;

const CHECKIN_EARLIEST_SECS: u32 = 8 * 3_600;
const CHECKIN_LATEST_SECS: u32 = 16 * 3_600;

pub const CLASSROOMS: [&str; 33] = [
    "CS-101",
    "CS-102",
    "CS-201",
    "CS-202",
    "CS-301",
    "CS-302",
    "EE-101",
    "EE-201",
    "EE-301",
    "EE-401",
    "ME-101",
    "ME-201",
    "ME-301",
    "ME-401",
    "CE-101",
    "CE-201",
    "CE-301",
    "CE-401",
    "MATH-101",
    "MATH-201",
    "MATH-301",
    "PHYS-101",
    "PHYS-201",
    "PHYS-301",
    "CHEM-101",
    "CHEM-201",
    "CHEM-301",
    "LECTURE-HALL-A",
    "LECTURE-HALL-B",
    "LECTURE-HALL-C",
    "LAB-101",
    "LAB-201",
    "LAB-301",
];

pub fn is_known_classroom(name: &str) -> bool {
    CLASSROOMS.contains(&name)
}

pub struct CampusStore {
    faculty: Vec<FacultyRecord>,
    schedules: Vec<ScheduleRecord>,
    attendance: Vec<AttendanceRecord>,
    latency: Duration,
}

impl CampusStore {
    pub fn seeded(today: NaiveDate, latency: Duration, rng: &mut impl Rng) -> anyhow::Result<Self> {
        let faculty = seed_faculty()?;
        let schedules = seed_schedules()?;
        let attendance = generate_attendance(&faculty, &schedules, today, rng);
        debug!(
            "seeded campus dataset: {} faculty, {} schedules, {} attendance records",
            faculty.len(),
            schedules.len(),
            attendance.len()
        );
        Ok(CampusStore {
            faculty,
            schedules,
            attendance,
            latency,
        })
    }

    pub async fn fetch_faculty(&self) -> Vec<FacultyRecord> {
        self.simulate_request().await;
        self.faculty.clone()
    }

    pub async fn fetch_schedules(&self) -> Vec<ScheduleRecord> {
        self.simulate_request().await;
        self.schedules.clone()
    }

    pub async fn fetch_attendance(&self) -> Vec<AttendanceRecord> {
        self.simulate_request().await;
        self.attendance.clone()
    }

    /// Mock write call. Same latency as the fetches; nothing persists between runs.
    pub async fn submit(&self) {
        self.simulate_request().await;
    }

    async fn simulate_request(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

pub fn seed_faculty() -> anyhow::Result<Vec<FacultyRecord>> {
    let rows = vec![
        (
            "FAC001",
            "Dr. Sarah Johnson",
            Department::ComputerScience,
            "Data Structures & Algorithms",
            "sarah.johnson@college.edu",
            "+1-555-0101",
            "Room 301, CS Building",
            (2020, 8, 15),
            94.5,
        ),
        (
            "FAC002",
            "Prof. Michael Chen",
            Department::ElectricalEngineering,
            "Digital Electronics",
            "michael.chen@college.edu",
            "+1-555-0102",
            "Room 205, EE Building",
            (2019, 3, 20),
            89.2,
        ),
        (
            "FAC003",
            "Dr. Emily Rodriguez",
            Department::Mathematics,
            "Calculus & Linear Algebra",
            "emily.rodriguez@college.edu",
            "+1-555-0103",
            "Room 102, Math Building",
            (2021, 1, 10),
            96.8,
        ),
        (
            "FAC004",
            "Prof. David Thompson",
            Department::MechanicalEngineering,
            "Thermodynamics",
            "david.thompson@college.edu",
            "+1-555-0104",
            "Room 401, ME Building",
            (2018, 9, 5),
            91.3,
        ),
        (
            "FAC005",
            "Dr. Lisa Wang",
            Department::ComputerScience,
            "Machine Learning",
            "lisa.wang@college.edu",
            "+1-555-0105",
            "Room 302, CS Building",
            (2022, 2, 28),
            88.7,
        ),
        (
            "FAC006",
            "Prof. James Wilson",
            Department::Physics,
            "Quantum Mechanics",
            "james.wilson@college.edu",
            "+1-555-0106",
            "Room 201, Physics Building",
            (2020, 11, 12),
            93.1,
        ),
        (
            "FAC007",
            "Dr. Maria Garcia",
            Department::Chemistry,
            "Organic Chemistry",
            "maria.garcia@college.edu",
            "+1-555-0107",
            "Room 105, Chemistry Building",
            (2019, 7, 22),
            95.4,
        ),
        (
            "FAC008",
            "Prof. Robert Kim",
            Department::CivilEngineering,
            "Structural Analysis",
            "robert.kim@college.edu",
            "+1-555-0108",
            "Room 501, CE Building",
            (2021, 5, 15),
            90.6,
        ),
    ];

    let mut faculty = Vec::new();
    for (id, name, department, subject, email, phone, office, (year, month, day), rate) in rows {
        faculty.push(FacultyRecord {
            id: id.to_string(),
            name: name.to_string(),
            department,
            subject: subject.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            office: office.to_string(),
            join_date: NaiveDate::from_ymd_opt(year, month, day).context("invalid join date")?,
            attendance_rate: rate,
        });
    }

    Ok(faculty)
}

pub fn seed_schedules() -> anyhow::Result<Vec<ScheduleRecord>> {
    let rows = vec![
        (
            "SCH001",
            "FAC001",
            "Data Structures & Algorithms",
            "CS-101",
            ClassDay::Monday,
            (9, 0),
            (10, 30),
            45,
        ),
        (
            "SCH002",
            "FAC002",
            "Digital Electronics",
            "EE-201",
            ClassDay::Monday,
            (11, 0),
            (12, 30),
            35,
        ),
        (
            "SCH003",
            "FAC003",
            "Calculus & Linear Algebra",
            "MATH-301",
            ClassDay::Tuesday,
            (9, 0),
            (10, 30),
            60,
        ),
        (
            "SCH004",
            "FAC004",
            "Thermodynamics",
            "ME-401",
            ClassDay::Tuesday,
            (14, 0),
            (15, 30),
            40,
        ),
        (
            "SCH005",
            "FAC005",
            "Machine Learning",
            "CS-202",
            ClassDay::Wednesday,
            (10, 0),
            (11, 30),
            30,
        ),
        (
            "SCH006",
            "FAC006",
            "Quantum Mechanics",
            "PHYS-201",
            ClassDay::Wednesday,
            (13, 0),
            (14, 30),
            25,
        ),
        (
            "SCH007",
            "FAC007",
            "Organic Chemistry",
            "CHEM-105",
            ClassDay::Thursday,
            (9, 0),
            (10, 30),
            50,
        ),
        (
            "SCH008",
            "FAC008",
            "Structural Analysis",
            "CE-501",
            ClassDay::Friday,
            (11, 0),
            (12, 30),
            35,
        ),
    ];

    let mut schedules = Vec::new();
    for (id, faculty_id, subject, classroom, day, (sh, sm), (eh, em), capacity) in rows {
        schedules.push(ScheduleRecord {
            id: id.to_string(),
            faculty_id: faculty_id.to_string(),
            subject: subject.to_string(),
            classroom: classroom.to_string(),
            day,
            start_time: NaiveTime::from_hms_opt(sh, sm, 0).context("invalid class time")?,
            end_time: NaiveTime::from_hms_opt(eh, em, 0).context("invalid class time")?,
            capacity,
        });
    }

    Ok(schedules)
}

pub fn generate_attendance(
    faculty: &[FacultyRecord],
    schedules: &[ScheduleRecord],
    today: NaiveDate,
    rng: &mut impl Rng,
) -> Vec<AttendanceRecord> {
    let mut records = Vec::new();

    for offset in 0..ATTENDANCE_WINDOW_DAYS {
        let date = today - chrono::Duration::days(offset);
        for member in faculty {
            if let Some(schedule) = schedules.iter().find(|s| s.faculty_id == member.id) {
                // Draw weighted by the member's historical rate.
                let present = rng.gen_range(0.0..100.0) < member.attendance_rate;
                let checkin_secs = rng.gen_range(CHECKIN_EARLIEST_SECS..CHECKIN_LATEST_SECS);
                let timestamp = (date.and_time(NaiveTime::MIN)
                    + chrono::Duration::seconds(i64::from(checkin_secs)))
                .and_utc();
                let confidence = if present {
                    Some((rng.gen_range(80.0..100.0_f64) * 10.0).round() / 10.0)
                } else {
                    None
                };

                records.push(AttendanceRecord {
                    id: format!("ATT_{}_{}", member.id, date),
                    faculty_id: member.id.clone(),
                    faculty_name: member.name.clone(),
                    subject: schedule.subject.clone(),
                    classroom: schedule.classroom.clone(),
                    date,
                    timestamp,
                    status: if present {
                        AttendanceStatus::Present
                    } else {
                        AttendanceStatus::Absent
                    },
                    method: if present {
                        CaptureMethod::FaceRecognition
                    } else {
                        CaptureMethod::Manual
                    },
                    confidence,
                });
            }
        }
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}
