//! Read-only view of the session consumed by guards and UI controls.

use serde::Serialize;

use crate::{Privilege, Role, UserIdentity};

/// Lifecycle state of the client session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// Before the persisted-session check has completed.
    Unknown,
    Anonymous,
    Authenticated,
}

/// Point-in-time copy of what the session core exposes.
///
/// Queries on a snapshot are pure: no I/O, no suspension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionSnapshot {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(UserIdentity),
}

impl SessionSnapshot {
    pub fn state(&self) -> AuthState {
        match self {
            SessionSnapshot::Unknown => AuthState::Unknown,
            SessionSnapshot::Anonymous => AuthState::Anonymous,
            SessionSnapshot::Authenticated(_) => AuthState::Authenticated,
        }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionSnapshot::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Exact role match; roles have no hierarchy.
    pub fn has_role(&self, role: Role) -> bool {
        self.user().is_some_and(|user| user.role == role)
    }

    /// ADMIN satisfies every privilege; otherwise the held privilege must
    /// rank at least as high as `privilege`.
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        match self.user() {
            None => false,
            Some(user) if user.role.is_admin() => true,
            Some(user) => user.privilege.satisfies(privilege),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopdesk_core::UserId;

    fn session(role: Role, privilege: Privilege) -> SessionSnapshot {
        SessionSnapshot::Authenticated(UserIdentity {
            user_id: UserId::new(10),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice".to_string(),
            role,
            privilege,
        })
    }

    #[test]
    fn unauthenticated_snapshots_deny_everything() {
        for snapshot in [SessionSnapshot::Unknown, SessionSnapshot::Anonymous] {
            assert!(!snapshot.is_authenticated());
            assert!(!snapshot.has_role(Role::Staff));
            assert!(!snapshot.has_privilege(Privilege::Read));
        }
    }

    #[test]
    fn read_is_granted_to_every_privilege_level() {
        for held in Privilege::ALL {
            assert!(session(Role::Staff, held).has_privilege(Privilege::Read));
        }
    }

    #[test]
    fn update_requires_update_or_admin() {
        assert!(session(Role::Staff, Privilege::Update).has_privilege(Privilege::Update));
        assert!(!session(Role::Staff, Privilege::Create).has_privilege(Privilege::Update));
        assert!(!session(Role::Staff, Privilege::Read).has_privilege(Privilege::Update));
        assert!(session(Role::Admin, Privilege::Read).has_privilege(Privilege::Update));
    }

    #[test]
    fn role_and_privilege_are_independent_axes() {
        let snapshot = session(Role::Staff, Privilege::Update);
        assert!(!snapshot.has_role(Role::Admin));
        assert!(snapshot.has_role(Role::Staff));
    }

    #[test]
    fn staff_with_create() {
        let snapshot = session(Role::Staff, Privilege::Create);
        assert!(snapshot.has_privilege(Privilege::Read));
        assert!(!snapshot.has_privilege(Privilege::Update));
        assert!(!snapshot.has_role(Role::Admin));
    }
}
