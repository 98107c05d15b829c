//! `shopdesk-auth`: pure authorization boundary of the dashboard.
//!
//! This crate is intentionally decoupled from HTTP, storage and timers: it
//! holds the session data model, the query semantics over it, and the gate
//! that route/UI guards evaluate.

pub mod gate;
pub mod identity;
pub mod privileges;
pub mod renewal;
pub mod roles;
pub mod routes;
pub mod snapshot;

pub use gate::{
    AccessExplanation, AccessRequirement, Denial, DenialKind, GuardOutcome, can_access,
    explain_access, guard,
};
pub use identity::{SessionRecord, TokenPair, UserIdentity};
pub use privileges::Privilege;
pub use renewal::{RenewalPolicyError, effective_renewal_interval, validate_renewal_interval};
pub use roles::Role;
pub use routes::{Route, navigation};
pub use snapshot::{AuthState, SessionSnapshot};
