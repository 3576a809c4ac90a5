use crate::core::{ListError, Result};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Role carried by a signed-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Manages users, packages and every booking
    Admin,
    /// Leads tours and manages assigned bookings
    Guide,
    /// Tourist: books packages and writes stories
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guide => "guide",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "guide" => Ok(Self::Guide),
            // Accounts created before roles existed come back as "tourist"
            "user" | "tourist" => Ok(Self::User),
            other => Err(ListError::InvalidRequest(format!("Unknown role '{}'", other))),
        }
    }
}

/// The signed-in account, as reported by the identity provider and the users endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    email: String,
    role: Role,
}

impl Session {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Outcome of a route guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectTo(String),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Decide whether `session` may open a screen that requires `required`.
///
/// | session      | required | outcome            |
/// |--------------|----------|--------------------|
/// | none         | any      | redirect to login  |
/// | any          | user     | allow              |
/// | role == req  | admin    | allow              |
/// | role == req  | guide    | allow              |
/// | otherwise    |          | redirect to home   |
pub fn guard(session: Option<&Session>, required: Role) -> Access {
    let Some(session) = session else {
        return Access::RedirectTo(LOGIN_PATH.to_string());
    };

    match required {
        Role::User => Access::Allow,
        role if session.role() == role => Access::Allow,
        _ => Access::RedirectTo(HOME_PATH.to_string()),
    }
}

lazy_static! {
    /// Dashboard screens and the role each one requires. Unlisted paths are public.
    static ref ROUTE_ROLES: HashMap<&'static str, Role> = {
        let mut routes = HashMap::new();
        routes.insert("/dashboard/manage-users", Role::Admin);
        routes.insert("/dashboard/manage-packages", Role::Admin);
        routes.insert("/dashboard/manage-bookings", Role::Admin);
        routes.insert("/dashboard/add-package", Role::Guide);
        routes.insert("/dashboard/assigned-tours", Role::Guide);
        routes.insert("/dashboard/guide-profile", Role::Guide);
        routes.insert("/dashboard/my-bookings", Role::User);
        routes.insert("/dashboard/wishlist", Role::User);
        routes.insert("/dashboard/payments", Role::User);
        routes.insert("/dashboard/add-story", Role::User);
        routes.insert("/dashboard/manage-stories", Role::User);
        routes.insert("/dashboard/profile", Role::User);
        routes
    };
}

/// Role required by a path, if any
pub fn required_role(path: &str) -> Option<Role> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    ROUTE_ROLES.get(path).copied()
}

/// Route guard over the dashboard route table
pub fn check_route(path: &str, session: Option<&Session>) -> Access {
    match required_role(path) {
        Some(role) => guard(session, role),
        None => Access::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_redirects_to_login() {
        for role in [Role::Admin, Role::Guide, Role::User] {
            assert_eq!(guard(None, role), Access::RedirectTo("/login".into()));
        }
    }

    #[test]
    fn test_decision_table() {
        let admin = Session::new("admin@explorebd.example", Role::Admin);
        let guide = Session::new("guide@explorebd.example", Role::Guide);
        let user = Session::new("user@explorebd.example", Role::User);

        assert!(guard(Some(&admin), Role::Admin).is_allowed());
        assert!(guard(Some(&guide), Role::Guide).is_allowed());
        assert!(guard(Some(&user), Role::User).is_allowed());
        assert!(guard(Some(&admin), Role::User).is_allowed());
        assert!(guard(Some(&guide), Role::User).is_allowed());

        assert_eq!(guard(Some(&user), Role::Admin), Access::RedirectTo("/".into()));
        assert_eq!(guard(Some(&guide), Role::Admin), Access::RedirectTo("/".into()));
        assert_eq!(guard(Some(&admin), Role::Guide), Access::RedirectTo("/".into()));
    }

    #[test]
    fn test_route_table() {
        let user = Session::new("user@explorebd.example", Role::User);

        assert_eq!(required_role("/dashboard/manage-users"), Some(Role::Admin));
        assert_eq!(required_role("/dashboard/manage-users/"), Some(Role::Admin));
        assert_eq!(required_role("/dashboard/my-bookings?page=2"), Some(Role::User));
        assert_eq!(required_role("/packages"), None);
        assert_eq!(required_role("/dashboard/add-package"), Some(Role::Guide));
        assert_eq!(required_role("/dashboard/assigned-tours"), Some(Role::Guide));

        assert!(check_route("/packages", None).is_allowed());
        assert!(check_route("/dashboard/my-bookings", Some(&user)).is_allowed());
        assert_eq!(
            check_route("/dashboard/manage-users", Some(&user)),
            Access::RedirectTo("/".into())
        );
        assert_eq!(
            check_route("/dashboard/wishlist", None),
            Access::RedirectTo("/login".into())
        );
    }

    #[test]
    fn test_guide_screens() {
        let guide = Session::new("guide@explorebd.example", Role::Guide);
        let admin = Session::new("admin@explorebd.example", Role::Admin);

        assert!(check_route("/dashboard/add-package", Some(&guide)).is_allowed());
        assert!(check_route("/dashboard/assigned-tours", Some(&guide)).is_allowed());
        assert_eq!(
            check_route("/dashboard/add-package", Some(&admin)),
            Access::RedirectTo("/".into())
        );
        assert_eq!(
            check_route("/dashboard/manage-packages", Some(&guide)),
            Access::RedirectTo("/".into())
        );
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("tourist".parse::<Role>().unwrap(), Role::User);
        assert!("owner".parse::<Role>().is_err());
    }
}
