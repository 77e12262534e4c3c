//! Client routes (screens)

use serde::{Deserialize, Serialize};

/// A screen of the client. Workflows answer with the route to show next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Login,
    CreateAccount,
    Dashboard,
    Transfers,
    Extract,
    Profile,
    Settings,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::CreateAccount,
        Route::Dashboard,
        Route::Transfers,
        Route::Extract,
        Route::Profile,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::CreateAccount => "/create-account",
            Self::Dashboard => "/dashboard",
            Self::Transfers => "/transfers",
            Self::Extract => "/extract",
            Self::Profile => "/profile",
            Self::Settings => "/settings",
        }
    }

    /// Exact lookup, with or without the leading slash
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_start_matches('/').trim_end_matches('/');
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.path().trim_start_matches('/') == trimmed)
    }

    /// Resolve a path. The empty path and unknown paths land on the dashboard.
    pub fn resolve(path: &str) -> Self {
        Self::from_path(path).unwrap_or(Self::Dashboard)
    }

    /// Whether entering this route requires a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login | Self::CreateAccount)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_paths() {
        assert_eq!(Route::resolve("/transfers"), Route::Transfers);
        assert_eq!(Route::resolve("extract"), Route::Extract);
        assert_eq!(Route::resolve("/create-account/"), Route::CreateAccount);
    }

    #[test]
    fn test_from_path_is_strict() {
        assert_eq!(Route::from_path("dashboard"), Some(Route::Dashboard));
        assert_eq!(Route::from_path(""), None);
        assert_eq!(Route::from_path("/nowhere"), None);
    }

    #[test]
    fn test_empty_and_unknown_paths_redirect_to_dashboard() {
        assert_eq!(Route::resolve(""), Route::Dashboard);
        assert_eq!(Route::resolve("/"), Route::Dashboard);
        assert_eq!(Route::resolve("/nowhere"), Route::Dashboard);
    }

    #[test]
    fn test_only_login_and_create_account_are_public() {
        let public: Vec<_> = Route::ALL.iter().filter(|r| !r.is_protected()).collect();
        assert_eq!(public, vec![&Route::Login, &Route::CreateAccount]);
    }
}
