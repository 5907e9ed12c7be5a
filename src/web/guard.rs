//! Authorization guard
//!
//! A pure decision function composed in front of handlers. Given the
//! request's optional authenticated user and the path being requested, it
//! either allows the call or names the redirect that denies it. Handlers
//! turn a denial into a flash-plus-redirect; the guard itself touches no
//! I/O.

use crate::models::User;
use crate::web::flash::FlashMessage;

/// Path of the login form denials redirect to
pub const LOGIN_PATH: &str = "/accounts/login";

/// Outcome of a guard check
#[derive(Debug)]
pub enum GuardDecision {
    /// The user may proceed
    Allowed(User),
    /// Redirect to `location`; `message` is flashed when present
    Denied {
        location: String,
        message: Option<FlashMessage>,
    },
}

/// Require any authenticated user.
///
/// Denials redirect to the login form with the original path in `next`,
/// silently; asking someone to log in is not an error worth flashing.
pub fn require_login(user: Option<User>, path: &str) -> GuardDecision {
    match user {
        Some(user) => GuardDecision::Allowed(user),
        None => GuardDecision::Denied {
            location: login_location(path),
            message: None,
        },
    }
}

/// Require a superuser.
///
/// Anonymous and non-superuser requests both land on the login form with
/// `next` set, and carry an authorization-failure flash.
pub fn require_superuser(user: Option<User>, path: &str) -> GuardDecision {
    match user {
        Some(user) if user.is_superuser => GuardDecision::Allowed(user),
        _ => GuardDecision::Denied {
            location: login_location(path),
            message: Some(FlashMessage::error(
                "You need administrator access to do that.",
            )),
        },
    }
}

/// The login path with `path` percent-encoded into the `next` parameter
fn login_location(path: &str) -> String {
    format!("{}?next={}", LOGIN_PATH, urlencoding::encode(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(is_superuser: bool) -> User {
        User::new("alice".to_string(), "hash".to_string(), is_superuser)
    }

    #[test]
    fn test_require_login_allows_any_user() {
        assert!(matches!(
            require_login(Some(user(false)), "/comment/create/1"),
            GuardDecision::Allowed(_)
        ));
        assert!(matches!(
            require_login(Some(user(true)), "/comment/create/1"),
            GuardDecision::Allowed(_)
        ));
    }

    #[test]
    fn test_require_login_denies_anonymous_silently() {
        match require_login(None, "/article/like/3") {
            GuardDecision::Denied { location, message } => {
                assert_eq!(location, "/accounts/login?next=%2Farticle%2Flike%2F3");
                assert!(message.is_none());
            }
            GuardDecision::Allowed(_) => panic!("anonymous must be denied"),
        }
    }

    #[test]
    fn test_require_superuser_denies_regular_user_with_message() {
        match require_superuser(Some(user(false)), "/article/create") {
            GuardDecision::Denied { location, message } => {
                assert_eq!(location, "/accounts/login?next=%2Farticle%2Fcreate");
                assert!(message.is_some());
            }
            GuardDecision::Allowed(_) => panic!("regular user must be denied"),
        }
    }

    #[test]
    fn test_require_superuser_denies_anonymous_with_message() {
        match require_superuser(None, "/article/create") {
            GuardDecision::Denied { message, .. } => assert!(message.is_some()),
            GuardDecision::Allowed(_) => panic!("anonymous must be denied"),
        }
    }

    #[test]
    fn test_require_superuser_allows_superuser() {
        assert!(matches!(
            require_superuser(Some(user(true)), "/article/create"),
            GuardDecision::Allowed(_)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_denied_location_roundtrips_the_path(path in "/[a-zA-Z0-9/_ %?&=-]{0,40}") {
            if let GuardDecision::Denied { location, .. } = require_login(None, &path) {
                let encoded = location
                    .strip_prefix("/accounts/login?next=")
                    .expect("denial must target the login form");
                let decoded = urlencoding::decode(encoded).expect("must decode");
                prop_assert_eq!(decoded.into_owned(), path);
            } else {
                prop_assert!(false, "anonymous must always be denied");
            }
        }
    }
}
