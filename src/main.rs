use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

mod conflict;
mod models;
mod report;
mod session;
mod stats;
mod store;

use models::{
    AttendanceStatus, ClassDay, ConflictEntry, Department, FacultyRecord, Role, ScheduleRecord,
    SessionUser,
};
use report::ReportFilters;
use session::{ProfileUpdate, RegisterForm, SessionStore};
use store::CampusStore;

const STATE_ENV_VAR: &str = "FACULTY_ATTENDANCE_STATE";
const RECENT_CHECKINS: usize = 10;

#[derive(Parser)]
#[command(name = "faculty-attendance")]
#[command(about = "Faculty attendance monitor over a mock campus dataset", long_about = None)]
struct Cli {
    /// Simulated network latency in milliseconds; 0 disables the delay
    #[arg(long, global = true, default_value_t = 1000)]
    latency_ms: u64,
    /// Session state file (default: $FACULTY_ATTENDANCE_STATE, then ~/.faculty-attendance/session.json)
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an email and password, or with a named demo account
    #[command(group(
        ArgGroup::new("identity")
            .args(["email", "demo"])
            .required(true)
            .multiple(false)
    ))]
    Login {
        #[arg(long, requires = "password")]
        email: Option<String>,
        #[arg(long, requires = "email", conflicts_with = "demo")]
        password: Option<String>,
        /// One of the built-in demo accounts
        #[arg(long, value_enum)]
        demo: Option<Role>,
    },
    /// Create a faculty account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, value_enum)]
        department: Department,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Switch the saved theme, or toggle it when no mode is given
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
    /// Update the signed-in user's name or department
    #[command(group(
        ArgGroup::new("changes")
            .args(["name", "department"])
            .required(true)
            .multiple(true)
    ))]
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum)]
        department: Option<Department>,
    },
    /// Today's attendance summary with department rollups
    Dashboard,
    /// Faculty directory
    #[command(subcommand)]
    Faculty(FacultyCommands),
    /// Class schedule catalog and conflict checks
    #[command(subcommand)]
    Schedule(ScheduleCommands),
    /// Attendance report, printed or exported as CSV
    Report {
        #[arg(long)]
        faculty_id: Option<String>,
        /// Restrict to a single date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, value_enum)]
        department: Option<Department>,
        #[arg(long, value_enum)]
        status: Option<AttendanceStatus>,
        /// Rows to print; exports always carry every matching row
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Write a CSV file instead of printing
        #[arg(long)]
        export: bool,
        #[arg(long, default_value = "attendance_report.csv")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum FacultyCommands {
    /// Print the roster
    List,
    /// Register a member into this run's roster (admin or hod only)
    Add {
        #[arg(long)]
        faculty_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        department: Department,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        office: String,
    },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Print the catalog along with any conflicts
    List,
    /// Add a class and re-check conflicts
    Add {
        #[arg(long)]
        faculty_id: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        classroom: String,
        #[arg(long, value_enum)]
        day: ClassDay,
        /// Wall-clock start, e.g. 09:00
        #[arg(long, value_parser = parse_wall_clock)]
        start_time: NaiveTime,
        #[arg(long, value_parser = parse_wall_clock)]
        end_time: NaiveTime,
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
        capacity: u32,
    },
    /// Remove a class by id and re-check conflicts
    Remove {
        #[arg(long)]
        id: String,
    },
    /// List scheduling conflicts only
    Conflicts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    let latency = Duration::from_millis(cli.latency_ms);
    let state_path = resolve_state_path(cli.state_file)?;
    debug!("session state at {}", state_path.display());
    let mut session = SessionStore::open(state_path, latency);

    match cli.command {
        Commands::Login {
            email,
            password,
            demo,
        } => {
            let (email, password) = match demo {
                Some(role) => {
                    let (email, password) = session::demo_credentials(role);
                    (email.to_string(), password.to_string())
                }
                None => (
                    email.context("--email is required without --demo")?,
                    password.context("--password is required with --email")?,
                ),
            };
            let user = session.login(&email, &password).await?;
            println!(
                "Welcome, {}! Signed in as {}.",
                user.name,
                user.role.as_str()
            );
        }
        Commands::Register {
            name,
            email,
            phone,
            department,
            password,
            confirm_password,
        } => {
            let user = session
                .register(RegisterForm {
                    name,
                    email,
                    phone,
                    department,
                    password,
                    confirm_password,
                })
                .await?;
            println!(
                "Registration successful! Signed in as {} ({}).",
                user.name, user.faculty_id
            );
        }
        Commands::Logout => {
            session.logout()?;
            println!("Signed out.");
        }
        Commands::Whoami => match session.current_user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                println!("Role: {}", user.role.as_str());
                println!("Department: {}", user.department.label());
                println!("Faculty ID: {}", user.faculty_id);
                println!("Token: {}", session.auth_token().unwrap_or("missing"));
                println!(
                    "Theme: {}",
                    if session.dark_mode() { "dark" } else { "light" }
                );
            }
            None => println!("Not signed in."),
        },
        Commands::Theme { mode } => {
            let enabled = match mode {
                Some(ThemeMode::Dark) => true,
                Some(ThemeMode::Light) => false,
                None => !session.dark_mode(),
            };
            session.set_dark_mode(enabled)?;
            println!("Dark mode {}.", if enabled { "on" } else { "off" });
        }
        Commands::Profile { name, department } => {
            require_session(&session)?;
            let user = session
                .update_profile(ProfileUpdate { name, department })
                .await?;
            println!(
                "Profile updated: {} ({}).",
                user.name,
                user.department.label()
            );
        }
        Commands::Dashboard => {
            require_session(&session)?;
            let campus = open_campus(latency)?;
            run_dashboard(&campus).await;
        }
        Commands::Faculty(command) => match command {
            FacultyCommands::List => {
                require_role(&session, &[Role::Admin, Role::Hod])?;
                let campus = open_campus(latency)?;
                run_faculty_list(&campus).await;
            }
            FacultyCommands::Add {
                faculty_id,
                name,
                department,
                subject,
                email,
                phone,
                office,
            } => {
                require_role(&session, &[Role::Admin, Role::Hod])?;
                let campus = open_campus(latency)?;
                let member = FacultyRecord {
                    id: faculty_id,
                    name,
                    department,
                    subject,
                    email,
                    phone,
                    office,
                    join_date: Utc::now().date_naive(),
                    attendance_rate: 0.0,
                };
                run_faculty_add(&campus, member).await;
            }
        },
        Commands::Schedule(command) => match command {
            ScheduleCommands::List => {
                require_session(&session)?;
                let campus = open_campus(latency)?;
                run_schedule_list(&campus).await;
            }
            ScheduleCommands::Add {
                faculty_id,
                subject,
                classroom,
                day,
                start_time,
                end_time,
                capacity,
            } => {
                require_session(&session)?;
                let campus = open_campus(latency)?;
                let entry = ScheduleRecord {
                    id: format!("SCH-{}", Uuid::new_v4()),
                    faculty_id,
                    subject,
                    classroom,
                    day,
                    start_time,
                    end_time,
                    capacity,
                };
                run_schedule_add(&campus, entry).await?;
            }
            ScheduleCommands::Remove { id } => {
                require_session(&session)?;
                let campus = open_campus(latency)?;
                run_schedule_remove(&campus, &id).await?;
            }
            ScheduleCommands::Conflicts => {
                require_session(&session)?;
                let campus = open_campus(latency)?;
                run_schedule_conflicts(&campus).await;
            }
        },
        Commands::Report {
            faculty_id,
            date,
            subject,
            department,
            status,
            limit,
            export,
            out,
        } => {
            require_session(&session)?;
            let campus = open_campus(latency)?;
            let filters = ReportFilters {
                faculty_id,
                date,
                subject,
                department,
                status,
            };
            run_report(&campus, filters, limit, export, out).await?;
        }
    }

    Ok(())
}

fn parse_wall_clock(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
}

fn resolve_state_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(STATE_ENV_VAR) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let home = std::env::var("HOME").context("HOME must be set to locate the session file")?;
    Ok(PathBuf::from(home)
        .join(".faculty-attendance")
        .join("session.json"))
}

fn open_campus(latency: Duration) -> anyhow::Result<CampusStore> {
    let mut rng = StdRng::from_entropy();
    CampusStore::seeded(Utc::now().date_naive(), latency, &mut rng)
}

fn require_session(session: &SessionStore) -> anyhow::Result<&SessionUser> {
    session
        .current_user()
        .context("not signed in; run the login command first")
}

fn require_role<'a>(session: &'a SessionStore, allowed: &[Role]) -> anyhow::Result<&'a SessionUser> {
    let user = require_session(session)?;
    if !session.has_any_role(allowed) {
        let wanted: Vec<&str> = allowed.iter().map(|role| role.as_str()).collect();
        anyhow::bail!(
            "access denied: requires {} (your role: {})",
            wanted.join(" or "),
            user.role.as_str()
        );
    }
    Ok(user)
}

async fn run_dashboard(campus: &CampusStore) {
    let faculty = campus.fetch_faculty().await;
    let schedules = campus.fetch_schedules().await;
    let attendance = campus.fetch_attendance().await;
    let today = Utc::now().date_naive();

    let summary = stats::today_summary(&attendance, today);
    let rollup = stats::department_rollup(&faculty, &attendance);
    let recent = stats::recent_attendance(&attendance, RECENT_CHECKINS);
    debug!(
        "newest check-in {}",
        recent.first().map(|r| r.id.as_str()).unwrap_or("none")
    );

    println!("Faculty Attendance Dashboard ({today})");
    println!(
        "Roster: {} faculty across {} scheduled classes",
        faculty.len(),
        schedules.len()
    );
    println!(
        "Today: {} present, {} absent of {} ({}% attendance)",
        summary.present, summary.absent, summary.total, summary.rate
    );
    println!();

    println!("Departments:");
    for entry in &rollup {
        println!(
            "- {}: {} faculty, {} of {} check-ins present (rate {}%)",
            entry.department.label(),
            entry.faculty_count,
            entry.present_count,
            entry.attendance_count,
            entry.average_rate
        );
    }

    println!();
    println!("Recent check-ins:");
    if recent.is_empty() {
        println!("No attendance recorded yet.");
    } else {
        for record in recent {
            println!(
                "- {} {} {}: {} in {}",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.status.as_str(),
                record.faculty_name,
                record.subject,
                record.classroom
            );
        }
    }
}

async fn run_faculty_list(campus: &CampusStore) {
    let faculty = campus.fetch_faculty().await;
    print!("{}", format_roster(&faculty));
}

async fn run_faculty_add(campus: &CampusStore, member: FacultyRecord) {
    let mut roster = campus.fetch_faculty().await;
    campus.submit().await;
    roster.push(member);

    println!("Faculty registered successfully!");
    print!("{}", format_roster(&roster));
    println!("Additions reset when the process exits.");
}

fn format_roster(faculty: &[FacultyRecord]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Faculty directory ({} members):", faculty.len());
    for member in faculty {
        let _ = writeln!(
            output,
            "- {} {} ({}): {} | {} | {} | {} | joined {}, rate {}%",
            member.id,
            member.name,
            member.department.label(),
            member.subject,
            member.email,
            member.phone,
            member.office,
            member.join_date,
            member.attendance_rate
        );
    }
    output
}

async fn run_schedule_list(campus: &CampusStore) {
    let schedules = campus.fetch_schedules().await;
    let faculty = campus.fetch_faculty().await;

    println!("Class schedules ({} entries):", schedules.len());
    for schedule in &schedules {
        let faculty_name = faculty
            .iter()
            .find(|f| f.id == schedule.faculty_id)
            .map(|f| f.name.as_str())
            .unwrap_or("Unknown");
        println!(
            "- {} {} {}-{} {} in {} with {} (capacity {})",
            schedule.id,
            schedule.day.label(),
            schedule.start_time.format("%H:%M"),
            schedule.end_time.format("%H:%M"),
            schedule.subject,
            schedule.classroom,
            faculty_name,
            schedule.capacity
        );
    }

    println!();
    print_conflicts(&conflict::detect_conflicts(&schedules));
}

async fn run_schedule_add(campus: &CampusStore, entry: ScheduleRecord) -> anyhow::Result<()> {
    if !store::is_known_classroom(&entry.classroom) {
        anyhow::bail!(
            "unknown classroom {}; valid rooms: {}",
            entry.classroom,
            store::CLASSROOMS.join(", ")
        );
    }

    let mut schedules = campus.fetch_schedules().await;
    let faculty = campus.fetch_faculty().await;
    if !faculty.iter().any(|f| f.id == entry.faculty_id) {
        anyhow::bail!("unknown faculty id {}", entry.faculty_id);
    }

    campus.submit().await;
    println!("Schedule added successfully!");
    println!(
        "- {} {} {}-{} {} in {} (capacity {})",
        entry.id,
        entry.day.label(),
        entry.start_time.format("%H:%M"),
        entry.end_time.format("%H:%M"),
        entry.subject,
        entry.classroom,
        entry.capacity
    );
    schedules.push(entry);

    print_conflicts(&conflict::detect_conflicts(&schedules));
    println!("Additions last for this run only.");
    Ok(())
}

async fn run_schedule_remove(campus: &CampusStore, id: &str) -> anyhow::Result<()> {
    let mut schedules = campus.fetch_schedules().await;
    let before = schedules.len();
    schedules.retain(|s| s.id != id);
    if schedules.len() == before {
        anyhow::bail!("no schedule with id {id}");
    }

    campus.submit().await;
    println!("Schedule deleted successfully!");
    print_conflicts(&conflict::detect_conflicts(&schedules));
    Ok(())
}

async fn run_schedule_conflicts(campus: &CampusStore) {
    let schedules = campus.fetch_schedules().await;
    print_conflicts(&conflict::detect_conflicts(&schedules));
}

fn print_conflicts(conflicts: &[ConflictEntry]) {
    if conflicts.is_empty() {
        println!("No scheduling conflicts detected.");
        return;
    }

    println!("Conflicts detected: {}", conflicts.len());
    for entry in conflicts {
        println!("- [{}] {}", entry.kind.as_str(), entry.message);
        println!(
            "    {} {} {}-{} in {}",
            entry.first.id,
            entry.first.day.label(),
            entry.first.start_time.format("%H:%M"),
            entry.first.end_time.format("%H:%M"),
            entry.first.classroom
        );
        println!(
            "    {} {} {}-{} in {}",
            entry.second.id,
            entry.second.day.label(),
            entry.second.start_time.format("%H:%M"),
            entry.second.end_time.format("%H:%M"),
            entry.second.classroom
        );
    }
}

async fn run_report(
    campus: &CampusStore,
    filters: ReportFilters,
    limit: usize,
    export: bool,
    out: PathBuf,
) -> anyhow::Result<()> {
    let attendance = campus.fetch_attendance().await;
    let faculty = campus.fetch_faculty().await;
    let matched = filters.apply(&attendance, &faculty);

    if export {
        let file = std::fs::File::create(&out)
            .with_context(|| format!("could not create {}", out.display()))?;
        report::write_csv(file, &matched, &faculty)?;
        println!("Exported {} rows to {}.", matched.len(), out.display());
        return Ok(());
    }

    print!("{}", report::build_report(&filters, &matched, limit));
    Ok(())
}
