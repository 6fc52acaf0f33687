//! Session credential record and interactive resolution
//!
//! A credential record is resolved once at session start and held in memory
//! only; it is never written to disk. `admin.password == None` signals the
//! operating identity is already a local administrator, so no elevation
//! wrapper is needed for the privileged retry.

use dialoguer::console::Term;
use dialoguer::{Input, Password};

use crate::error::{Result, SilentPushError};

/// A domain user/password pair used for network share mounts.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

/// The administrator identity used for the privileged retry.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredential {
    pub user: String,
    /// `None` means the current identity is already elevated.
    pub password: Option<String>,
}

/// Resolved credentials for one session.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub domain: Option<Credential>,
    pub admin: AdminCredential,
}

impl CredentialRecord {
    /// Whether the privileged retry can skip the elevation wrapper.
    pub fn already_elevated(&self) -> bool {
        self.admin.password.is_none()
    }

    /// Build a record for an identity that is already a local administrator.
    pub fn elevated(user: impl Into<String>) -> Self {
        Self {
            domain: None,
            admin: AdminCredential {
                user: user.into(),
                password: None,
            },
        }
    }
}

// Passwords stay out of Debug output.
impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("domain_user", &self.domain.as_ref().map(|c| &c.user))
            .field("admin_user", &self.admin.user)
            .field("already_elevated", &self.already_elevated())
            .finish()
    }
}

/// Prompt for domain and administrator credentials on the terminal.
///
/// `already_admin` skips the admin password prompt and records the current
/// identity as elevated. An empty user name cancels the session.
pub fn resolve_interactively(already_admin: bool) -> Result<CredentialRecord> {
    let term = Term::stderr();

    let domain_user: String = Input::new()
        .with_prompt("Domain user (empty to cancel)")
        .allow_empty(true)
        .interact_text_on(&term)?;
    if domain_user.trim().is_empty() {
        return Err(SilentPushError::AuthCancelled);
    }

    let domain_password: String = Password::new()
        .with_prompt("Domain password")
        .allow_empty_password(true)
        .interact_on(&term)?;

    let domain = Some(Credential {
        user: domain_user.trim().to_string(),
        password: domain_password,
    });

    if already_admin {
        let user = current_user();
        return Ok(CredentialRecord {
            domain,
            admin: AdminCredential {
                user,
                password: None,
            },
        });
    }

    let admin_user: String = Input::new()
        .with_prompt("Administrator user")
        .default(current_user())
        .interact_text_on(&term)?;
    if admin_user.trim().is_empty() {
        return Err(SilentPushError::AuthCancelled);
    }

    let admin_password: String = Password::new()
        .with_prompt("Administrator password")
        .interact_on(&term)?;
    if admin_password.is_empty() {
        return Err(SilentPushError::AuthCancelled);
    }

    Ok(CredentialRecord {
        domain,
        admin: AdminCredential {
            user: admin_user.trim().to_string(),
            password: Some(admin_password),
        },
    })
}

/// Best-effort `HOST\user` identity of the running process.
pub fn current_user() -> String {
    let user = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "unknown".to_string());
    match std::env::var("COMPUTERNAME").or_else(|_| std::env::var("HOSTNAME")) {
        Ok(host) => format!("{}\\{}", host, user),
        Err(_) => user,
    }
}
