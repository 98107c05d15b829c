//! Dashboard screens and the access requirement each one carries.

use serde::Serialize;

use crate::{AccessRequirement, Role, SessionSnapshot, can_access};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Inventory,
    Billing,
    Quotation,
    Users,
    Staff,
    Analytics,
    Expense,
    Profile,
}

impl Route {
    pub const ALL: [Route; 12] = [
        Route::Login,
        Route::ForgotPassword,
        Route::ResetPassword,
        Route::Dashboard,
        Route::Inventory,
        Route::Billing,
        Route::Quotation,
        Route::Users,
        Route::Staff,
        Route::Analytics,
        Route::Expense,
        Route::Profile,
    ];

    /// Sidebar order.
    const NAVIGATION: [Route; 9] = [
        Route::Dashboard,
        Route::Inventory,
        Route::Billing,
        Route::Quotation,
        Route::Users,
        Route::Staff,
        Route::Analytics,
        Route::Expense,
        Route::Profile,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
            Route::Dashboard => "/dashboard",
            Route::Inventory => "/inventory",
            Route::Billing => "/billing",
            Route::Quotation => "/quotation",
            Route::Users => "/users",
            Route::Staff => "/staff",
            Route::Analytics => "/analytics",
            Route::Expense => "/expense",
            Route::Profile => "/profile",
        }
    }

    /// Resolve a path; `/` resolves to the dashboard.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Route::Dashboard);
        }
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::ForgotPassword => "Forgot Password",
            Route::ResetPassword => "Reset Password",
            Route::Dashboard => "Dashboard",
            Route::Inventory => "Inventory",
            Route::Billing => "Billing",
            Route::Quotation => "Quotation",
            Route::Users => "Users",
            Route::Staff => "Staff",
            Route::Analytics => "Analytics",
            Route::Expense => "Expense",
            Route::Profile => "Profile",
        }
    }

    /// Reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::ForgotPassword | Route::ResetPassword)
    }

    /// Guard parameters for a protected screen. Public screens have none.
    pub fn requirement(&self) -> Option<AccessRequirement> {
        if self.is_public() {
            return None;
        }
        match self {
            Route::Users | Route::Staff | Route::Analytics => {
                Some(AccessRequirement::role(Role::Admin))
            }
            _ => Some(AccessRequirement::none()),
        }
    }
}

/// Sidebar entries visible to `snapshot`, in display order.
pub fn navigation(snapshot: &SessionSnapshot) -> Vec<Route> {
    Route::NAVIGATION
        .into_iter()
        .filter(|route| {
            route
                .requirement()
                .is_some_and(|required| can_access(snapshot, &required))
        })
        .collect()
}
