use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Department {
    #[serde(rename = "Computer Science")]
    ComputerScience,
    #[serde(rename = "Electrical Engineering")]
    ElectricalEngineering,
    #[serde(rename = "Mechanical Engineering")]
    MechanicalEngineering,
    #[serde(rename = "Civil Engineering")]
    CivilEngineering,
    #[serde(rename = "Mathematics")]
    Mathematics,
    #[serde(rename = "Physics")]
    Physics,
    #[serde(rename = "Chemistry")]
    Chemistry,
    #[serde(rename = "Information Technology")]
    InformationTechnology,
}

impl Department {
    pub fn label(&self) -> &'static str {
        match self {
            Department::ComputerScience => "Computer Science",
            Department::ElectricalEngineering => "Electrical Engineering",
            Department::MechanicalEngineering => "Mechanical Engineering",
            Department::CivilEngineering => "Civil Engineering",
            Department::Mathematics => "Mathematics",
            Department::Physics => "Physics",
            Department::Chemistry => "Chemistry",
            Department::InformationTechnology => "Information Technology",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClassDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl ClassDay {
    pub fn label(&self) -> &'static str {
        match self {
            ClassDay::Monday => "Monday",
            ClassDay::Tuesday => "Tuesday",
            ClassDay::Wednesday => "Wednesday",
            ClassDay::Thursday => "Thursday",
            ClassDay::Friday => "Friday",
            ClassDay::Saturday => "Saturday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMethod {
    FaceRecognition,
    Manual,
}

impl CaptureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMethod::FaceRecognition => "face_recognition",
            CaptureMethod::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Hod,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Hod => "hod",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FacultyRecord {
    pub id: String,
    pub name: String,
    pub department: Department,
    pub subject: String,
    pub email: String,
    pub phone: String,
    pub office: String,
    pub join_date: NaiveDate,
    /// Historical attendance percentage, used as the weight for synthetic draws.
    pub attendance_rate: f64,
}

#[derive(Debug, Clone)]
pub struct ScheduleRecord {
    pub id: String,
    pub faculty_id: String,
    pub subject: String,
    pub classroom: String,
    pub day: ClassDay,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: u32,
}

#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub id: String,
    pub faculty_id: String,
    pub faculty_name: String,
    pub subject: String,
    pub classroom: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub method: CaptureMethod,
    /// Recognition confidence in percent. Only present check-ins carry one.
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AttendanceTotals {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub rate: String,
}

#[derive(Debug, Clone)]
pub struct DepartmentStats {
    pub department: Department,
    pub faculty_count: usize,
    pub attendance_count: usize,
    pub present_count: usize,
    pub average_rate: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Classroom,
    Faculty,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::Classroom => "classroom",
            ConflictKind::Faculty => "faculty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConflictEntry {
    pub kind: ConflictKind,
    pub first: ScheduleRecord,
    pub second: ScheduleRecord,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: Department,
    pub faculty_id: String,
}

impl SessionUser {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
