//! Role-gated route table and the per-role sidebar.

use crate::domain::model::{User, UserRole};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Employees,
    Departments,
    Roles,
    Profile,
    Attendance,
    Payroll,
    CreateHr,
    DashboardConfig,
    LeaveRequest,
    LeaveManagement,
    LeaveApprovals,
    AttendanceManagement,
}

const MANAGERS: &[UserRole] = &[UserRole::Hr, UserRole::Superadmin];
const SUPERADMIN: &[UserRole] = &[UserRole::Superadmin];
const EMPLOYEE: &[UserRole] = &[UserRole::Employee];

impl Route {
    pub const ALL: [Route; 14] = [
        Route::Login,
        Route::Dashboard,
        Route::Employees,
        Route::Departments,
        Route::Roles,
        Route::Profile,
        Route::Attendance,
        Route::Payroll,
        Route::CreateHr,
        Route::DashboardConfig,
        Route::LeaveRequest,
        Route::LeaveManagement,
        Route::LeaveApprovals,
        Route::AttendanceManagement,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Employees => "/employees",
            Route::Departments => "/departments",
            Route::Roles => "/roles",
            Route::Profile => "/profile",
            Route::Attendance => "/attendance",
            Route::Payroll => "/payroll",
            Route::CreateHr => "/superadmin/create-hr",
            Route::DashboardConfig => "/superadmin/dashboard-config",
            Route::LeaveRequest => "/leave-request",
            Route::LeaveManagement => "/leave-management",
            Route::LeaveApprovals => "/leave-approvals",
            Route::AttendanceManagement => "/attendance-management",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.split(['?', '#']).next().unwrap_or(path);
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login)
    }

    /// `None` means any signed-in user.
    pub fn allowed_roles(&self) -> Option<&'static [UserRole]> {
        match self {
            Route::Departments | Route::Roles | Route::LeaveApprovals => Some(MANAGERS),
            Route::CreateHr | Route::DashboardConfig => Some(SUPERADMIN),
            Route::LeaveManagement | Route::AttendanceManagement => Some(EMPLOYEE),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectToLogin,
    /// Signed in but the role is not allowed; the shell shows a denial page.
    Forbidden,
}

pub fn authorize(route: Route, user: Option<&User>) -> Access {
    if route.is_public() {
        return Access::Granted;
    }
    let Some(user) = user else {
        return Access::RedirectToLogin;
    };
    match route.allowed_roles() {
        Some(roles) if !roles.contains(&user.role) => {
            tracing::debug!("🚫 {} denied {}", user.role, route);
            Access::Forbidden
        }
        _ => Access::Granted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub route: Route,
}

const fn item(label: &'static str, route: Route) -> MenuItem {
    MenuItem { label, route }
}

pub fn sidebar(role: UserRole) -> Vec<MenuItem> {
    let mut items = vec![item("Dashboard", Route::Dashboard), item("Profile", Route::Profile)];
    match role {
        UserRole::Superadmin => items.extend([
            item("Create HR", Route::CreateHr),
            item("Dashboard Config", Route::DashboardConfig),
            item("Payroll", Route::Payroll),
            item("Approvals", Route::LeaveApprovals),
        ]),
        UserRole::Hr => items.extend([
            item("Employees", Route::Employees),
            item("Departments", Route::Departments),
            item("Roles", Route::Roles),
            item("Attendance", Route::Attendance),
            item("Approvals", Route::LeaveApprovals),
            item("Payroll", Route::Payroll),
        ]),
        UserRole::Employee => items.extend([
            item("Attendance Management", Route::AttendanceManagement),
            item("Leave Management", Route::LeaveManagement),
            item("Request Leave", Route::LeaveRequest),
        ]),
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User::new("U1", "Test User", "t@hrm.com", role)
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path(""), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/roles/"), Some(Route::Roles));
        assert_eq!(Route::from_path("/profile?tab=address"), Some(Route::Profile));
        assert_eq!(
            Route::from_path("/superadmin/create-hr"),
            Some(Route::CreateHr)
        );
        assert_eq!(Route::from_path("/nowhere"), None);
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_authorize() {
        assert_eq!(authorize(Route::Login, None), Access::Granted);
        assert_eq!(authorize(Route::Dashboard, None), Access::RedirectToLogin);

        let employee = user(UserRole::Employee);
        let hr = user(UserRole::Hr);
        let admin = user(UserRole::Superadmin);
        assert_eq!(authorize(Route::Profile, Some(&employee)), Access::Granted);
        assert_eq!(authorize(Route::Departments, Some(&employee)), Access::Forbidden);
        assert_eq!(authorize(Route::Departments, Some(&hr)), Access::Granted);
        assert_eq!(authorize(Route::CreateHr, Some(&hr)), Access::Forbidden);
        assert_eq!(authorize(Route::CreateHr, Some(&admin)), Access::Granted);
        assert_eq!(authorize(Route::LeaveManagement, Some(&admin)), Access::Forbidden);
        assert_eq!(
            authorize(Route::AttendanceManagement, Some(&employee)),
            Access::Granted
        );
    }

    #[test]
    fn test_sidebar_only_links_reachable_routes() {
        for role in UserRole::ALL {
            let u = user(role);
            let items = sidebar(role);
            assert_eq!(items[0].route, Route::Dashboard);
            for entry in &items {
                assert_eq!(authorize(entry.route, Some(&u)), Access::Granted, "{:?}", entry);
            }
        }
        assert_eq!(sidebar(UserRole::Employee).len(), 5);
        assert_eq!(sidebar(UserRole::Hr).len(), 8);
    }

    #[test]
    fn test_sidebar_entries_per_role() {
        let routes = |role| sidebar(role).into_iter().map(|i| i.route).collect::<Vec<_>>();
        assert_eq!(
            routes(UserRole::Superadmin),
            [
                Route::Dashboard,
                Route::Profile,
                Route::CreateHr,
                Route::DashboardConfig,
                Route::Payroll,
                Route::LeaveApprovals,
            ]
        );
        assert_eq!(
            routes(UserRole::Hr),
            [
                Route::Dashboard,
                Route::Profile,
                Route::Employees,
                Route::Departments,
                Route::Roles,
                Route::Attendance,
                Route::LeaveApprovals,
                Route::Payroll,
            ]
        );
        assert_eq!(
            routes(UserRole::Employee),
            [
                Route::Dashboard,
                Route::Profile,
                Route::AttendanceManagement,
                Route::LeaveManagement,
                Route::LeaveRequest,
            ]
        );
        let labels: Vec<_> = sidebar(UserRole::Employee).iter().map(|i| i.label).collect();
        assert_eq!(labels[4], "Request Leave");
    }
}
