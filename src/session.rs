use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;

use crate::models::{Department, Role, SessionUser};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("no user is signed in")]
    NotSignedIn,
}

#[derive(Debug)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: Department,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub department: Option<Department>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionState {
    #[serde(default)]
    current_user: Option<SessionUser>,
    #[serde(default)]
    auth_token: Option<String>,
    #[serde(default)]
    dark_mode: bool,
}

struct Account {
    user: SessionUser,
    password: String,
}

/// Per-user state backed by a JSON file. Accounts themselves live in memory
/// only, so registrations last for a single run; the signed-in session and
/// the theme choice are what survive between invocations.
pub struct SessionStore {
    path: PathBuf,
    latency: Duration,
    accounts: Vec<Account>,
    state: SessionState,
}

impl SessionStore {
    pub fn open(path: impl Into<PathBuf>, latency: Duration) -> Self {
        let path = path.into();
        let state = load_state(&path);
        SessionStore {
            path,
            latency,
            accounts: demo_accounts(),
            state,
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> anyhow::Result<SessionUser> {
        self.simulate_request().await;
        let account = self
            .accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        let user = account.user.clone();
        self.start_session(user.clone())?;
        Ok(user)
    }

    pub async fn register(&mut self, form: RegisterForm) -> anyhow::Result<SessionUser> {
        if form.name.trim().is_empty() {
            return Err(AuthError::MissingField("name").into());
        }
        if form.phone.trim().is_empty() {
            return Err(AuthError::MissingField("phone").into());
        }
        if !form.email.contains('@') {
            return Err(AuthError::InvalidEmail.into());
        }
        if form.password.chars().count() < 6 {
            return Err(AuthError::PasswordTooShort.into());
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch.into());
        }

        self.simulate_request().await;
        if self.accounts.iter().any(|a| a.user.email == form.email) {
            return Err(AuthError::EmailTaken.into());
        }

        // Self-registration always lands in the faculty role.
        let id = self.accounts.len() as u32 + 1;
        let user = SessionUser {
            id,
            email: form.email,
            name: form.name,
            role: Role::Faculty,
            department: form.department,
            faculty_id: derive_faculty_id(form.department, id),
        };
        self.accounts.push(Account {
            user: user.clone(),
            password: form.password,
        });
        self.start_session(user.clone())?;
        Ok(user)
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> anyhow::Result<SessionUser> {
        self.simulate_request().await;
        let user = self
            .state
            .current_user
            .as_mut()
            .ok_or(AuthError::NotSignedIn)?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(department) = update.department {
            user.department = department;
        }
        let updated = user.clone();
        self.persist()?;
        Ok(updated)
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.state.current_user = None;
        self.state.auth_token = None;
        self.persist()
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.state.current_user.as_ref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.state.auth_token.as_deref()
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.current_user().is_some_and(|user| user.has_any_role(roles))
    }

    pub fn dark_mode(&self) -> bool {
        self.state.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> anyhow::Result<()> {
        self.state.dark_mode = enabled;
        self.persist()
    }

    fn start_session(&mut self, user: SessionUser) -> anyhow::Result<()> {
        self.state.auth_token = Some(issue_token(user.id));
        self.state.current_user = Some(user);
        self.persist()
    }

    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("could not write session state to {}", self.path.display()))
    }

    async fn simulate_request(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

pub fn demo_credentials(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::Admin => ("admin@college.edu", "admin123"),
        Role::Faculty => ("faculty@college.edu", "faculty123"),
        Role::Hod => ("hod@college.edu", "hod123"),
    }
}

fn demo_accounts() -> Vec<Account> {
    let rows = vec![
        (
            1,
            "admin@college.edu",
            "admin123",
            "Admin User",
            Role::Admin,
            Department::InformationTechnology,
            "ADM001",
        ),
        (
            2,
            "faculty@college.edu",
            "faculty123",
            "Dr. Sarah Johnson",
            Role::Faculty,
            Department::ComputerScience,
            "CS001",
        ),
        (
            3,
            "hod@college.edu",
            "hod123",
            "Prof. Michael Chen",
            Role::Hod,
            Department::ComputerScience,
            "CS002",
        ),
    ];

    let mut accounts = Vec::new();
    for (id, email, password, name, role, department, faculty_id) in rows {
        accounts.push(Account {
            user: SessionUser {
                id,
                email: email.to_string(),
                name: name.to_string(),
                role,
                department,
                faculty_id: faculty_id.to_string(),
            },
            password: password.to_string(),
        });
    }
    accounts
}

fn derive_faculty_id(department: Department, id: u32) -> String {
    let prefix: String = department.label().chars().take(2).collect();
    format!("{}{id:03}", prefix.to_uppercase())
}

fn issue_token(user_id: u32) -> String {
    format!("token_{}_{}", user_id, Utc::now().timestamp_millis())
}

fn load_state(path: &Path) -> SessionState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return SessionState::default(),
        Err(err) => {
            warn!("could not read session state at {}: {err}", path.display());
            return SessionState::default();
        }
    };

    let mut state: SessionState = match serde_json::from_str(&raw) {
        Ok(state) => state,
        Err(err) => {
            warn!("discarding corrupt session state at {}: {err}", path.display());
            return SessionState::default();
        }
    };

    // A session restores only when the user and the token both survived.
    if state.current_user.is_none() || state.auth_token.is_none() {
        state.current_user = None;
        state.auth_token = None;
    }
    state
}
