//! Route guard

use crate::domain::Route;
use crate::services::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed(Route),
    Denied { redirect: Route },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Where navigation actually ends up
    pub fn destination(&self) -> Route {
        match self {
            Self::Allowed(route) => *route,
            Self::Denied { redirect } => *redirect,
        }
    }
}

/// Lets navigation through to protected routes only with a token present.
/// The token is not decoded or checked for expiry.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionContext,
}

impl RouteGuard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn check(&self, route: Route) -> GuardDecision {
        if !route.is_protected() || self.session.is_authenticated() {
            GuardDecision::Allowed(route)
        } else {
            GuardDecision::Denied {
                redirect: Route::Login,
            }
        }
    }

    /// Resolve a path and check it
    pub fn navigate(&self, path: &str) -> GuardDecision {
        self.check(Route::resolve(path))
    }
}
