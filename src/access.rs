use crate::error::AppError;
use crate::models::User;

/// Who may open a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    Public,
    /// Login and register: pointless once signed in.
    GuestOnly,
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    SignIn,
    GoHome,
}

impl Decision {
    pub fn location(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::SignIn => Some("/login"),
            Decision::GoHome => Some("/"),
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::SignIn => Err(AppError::Unauthorized),
            Decision::GoHome => Err(AppError::Forbidden),
        }
    }
}

impl RouteGuard {
    pub fn decide(&self, user: Option<&User>) -> Decision {
        match (self, user) {
            (RouteGuard::Public, _) => Decision::Allow,
            (RouteGuard::GuestOnly, Some(_)) => Decision::GoHome,
            (RouteGuard::GuestOnly, None) => Decision::Allow,
            (RouteGuard::User | RouteGuard::Admin, None) => Decision::SignIn,
            (RouteGuard::Admin, Some(user)) if !user.is_admin() => Decision::GoHome,
            (RouteGuard::User | RouteGuard::Admin, Some(_)) => Decision::Allow,
        }
    }
}
