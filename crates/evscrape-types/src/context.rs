//! Choice of the app's entry path.

use core::fmt;

/// Entry path taken from the logged-out screen.
///
/// Chosen once per run and never changed afterwards.
#[derive(Clone, PartialEq, Eq)]
pub enum NavigationContext {
    /// Sign in with an account.
    Credentialed { user_id: String, password: String },
    /// Use the app's built-in demo vehicle.
    Demo,
}

/// Why a run fell back to demo mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    MissingUserId,
    MissingPassword,
    MissingBoth,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUserId => write!(f, "user ID missing"),
            Self::MissingPassword => write!(f, "password missing"),
            Self::MissingBoth => write!(f, "user ID and password missing"),
        }
    }
}

impl NavigationContext {
    /// Pick the entry path from the run's inputs.
    ///
    /// The demo flag always wins. Without it, both credentials must be
    /// present and non-empty; otherwise the run degrades to demo mode and
    /// the reason is returned so the caller can warn about it.
    pub fn resolve(
        user_id: Option<&str>,
        password: Option<&str>,
        demo: bool,
    ) -> (Self, Option<FallbackReason>) {
        if demo {
            return (Self::Demo, None);
        }

        let user_id = user_id.filter(|s| !s.is_empty());
        let password = password.filter(|s| !s.is_empty());
        match (user_id, password) {
            (Some(user_id), Some(password)) => (
                Self::Credentialed {
                    user_id: user_id.to_string(),
                    password: password.to_string(),
                },
                None,
            ),
            (None, Some(_)) => (Self::Demo, Some(FallbackReason::MissingUserId)),
            (Some(_), None) => (Self::Demo, Some(FallbackReason::MissingPassword)),
            (None, None) => (Self::Demo, Some(FallbackReason::MissingBoth)),
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo)
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credentialed { user_id, .. } => f
                .debug_struct("Credentialed")
                .field("user_id", user_id)
                .field("password", &"<redacted>")
                .finish(),
            Self::Demo => f.write_str("Demo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_flag_wins_over_credentials() {
        let (ctx, reason) = NavigationContext::resolve(Some("me"), Some("pw"), true);
        assert_eq!(ctx, NavigationContext::Demo);
        assert_eq!(reason, None);
    }

    #[test]
    fn test_full_credentials_sign_in() {
        let (ctx, reason) = NavigationContext::resolve(Some("me"), Some("pw"), false);
        assert!(!ctx.is_demo());
        assert_eq!(reason, None);
    }

    #[test]
    fn test_missing_credentials_fall_back() {
        let cases = [
            (None, Some("pw"), FallbackReason::MissingUserId),
            (Some("me"), None, FallbackReason::MissingPassword),
            (None, None, FallbackReason::MissingBoth),
            (Some(""), Some("pw"), FallbackReason::MissingUserId),
        ];
        for (user, pass, expected) in cases {
            let (ctx, reason) = NavigationContext::resolve(user, pass, false);
            assert!(ctx.is_demo());
            assert_eq!(reason, Some(expected));
        }
    }

    #[test]
    fn test_missing_credentials_with_demo_flag_is_silent() {
        let (ctx, reason) = NavigationContext::resolve(None, None, true);
        assert!(ctx.is_demo());
        assert_eq!(reason, None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let (ctx, _) = NavigationContext::resolve(Some("me"), Some("hunter2"), false);
        let debug = format!("{:?}", ctx);
        assert!(debug.contains("me"));
        assert!(!debug.contains("hunter2"));
    }
}
