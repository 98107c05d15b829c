use serde::Serialize;

use crate::{AuthState, Privilege, Role, SessionSnapshot};

/// What a protected view asks of the session.
///
/// Mirrors the guard parameters `requireRole?` / `requirePrivilege?`. Both
/// unset means "any authenticated user".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AccessRequirement {
    pub role: Option<Role>,
    pub privilege: Option<Privilege>,
}

impl AccessRequirement {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            privilege: None,
        }
    }

    pub fn privilege(privilege: Privilege) -> Self {
        Self {
            role: None,
            privilege: Some(privilege),
        }
    }

    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = Some(privilege);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "required")]
pub enum DenialKind {
    MissingRole(Role),
    InsufficientPrivilege(Privilege),
}

/// A designed, displayable denial. Not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub kind: DenialKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl Denial {
    fn missing_role(role: Role) -> Self {
        Self {
            kind: DenialKind::MissingRole(role),
            title: "Access Denied",
            message: "You don't have permission to access this page.",
        }
    }

    fn insufficient_privilege(privilege: Privilege) -> Self {
        Self {
            kind: DenialKind::InsufficientPrivilege(privilege),
            title: "Insufficient Privileges",
            message: "You don't have the required privileges for this action.",
        }
    }
}

/// The three (plus one) mutually exclusive things a guard can render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardOutcome {
    /// Session state not known yet; show a placeholder.
    Loading,
    RedirectToLogin,
    Denied(Denial),
    Render,
}

impl GuardOutcome {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardOutcome::Render)
    }
}

fn first_denial(snapshot: &SessionSnapshot, required: &AccessRequirement) -> Option<Denial> {
    if let Some(role) = required.role {
        if !snapshot.has_role(role) {
            return Some(Denial::missing_role(role));
        }
    }
    if let Some(privilege) = required.privilege {
        if !snapshot.has_privilege(privilege) {
            return Some(Denial::insufficient_privilege(privilege));
        }
    }
    None
}

/// Decide whether `snapshot` passes `required`.
///
/// - No IO
/// - No panics
pub fn can_access(snapshot: &SessionSnapshot, required: &AccessRequirement) -> bool {
    snapshot.is_authenticated() && first_denial(snapshot, required).is_none()
}

/// Evaluate a route/UI guard against the current snapshot.
///
/// The role requirement is checked before the privilege requirement.
pub fn guard(snapshot: &SessionSnapshot, required: &AccessRequirement) -> GuardOutcome {
    match snapshot.state() {
        AuthState::Unknown => GuardOutcome::Loading,
        AuthState::Anonymous => GuardOutcome::RedirectToLogin,
        AuthState::Authenticated => match first_denial(snapshot, required) {
            Some(denial) => {
                tracing::debug!(?denial.kind, "guard denied access");
                GuardOutcome::Denied(denial)
            }
            None => GuardOutcome::Render,
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an access decision, for debugging denials.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub requirement: AccessRequirement,
    pub granted: bool,
    pub state: AuthState,
    pub held_role: Option<Role>,
    pub held_privilege: Option<Privilege>,
    /// Human-readable reason for the decision.
    pub reason: String,
    pub denial: Option<DenialKind>,
}

/// Explain why a guard would allow or deny access.
pub fn explain_access(snapshot: &SessionSnapshot, required: &AccessRequirement) -> AccessExplanation {
    let user = snapshot.user();
    let denial = first_denial(snapshot, required);
    let granted = user.is_some() && denial.is_none();

    let reason = match (user, &denial) {
        (None, _) => match snapshot.state() {
            AuthState::Unknown => "Session state has not been determined yet".to_string(),
            _ => "No authenticated session".to_string(),
        },
        (Some(_), Some(d)) => match d.kind {
            DenialKind::MissingRole(role) => format!(
                "Role '{}' required; session holds role '{}'",
                role,
                user.map(|u| u.role.as_str()).unwrap_or_default()
            ),
            DenialKind::InsufficientPrivilege(privilege) => format!(
                "Privilege '{}' required; session holds '{}'",
                privilege,
                user.map(|u| u.privilege.as_str()).unwrap_or_default()
            ),
        },
        (Some(u), None) if u.role.is_admin() && required.privilege.is_some() => {
            "Session has role 'ADMIN', which satisfies every privilege".to_string()
        }
        (Some(_), None) => "Session satisfies every requirement".to_string(),
    };

    AccessExplanation {
        requirement: *required,
        granted,
        state: snapshot.state(),
        held_role: user.map(|u| u.role),
        held_privilege: user.map(|u| u.privilege),
        reason,
        denial: denial.map(|d| d.kind),
    }
}
