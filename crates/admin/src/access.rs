//! Role gate for the dashboard.
//!
//! The gate is client-side convenience only; the service's own rules are
//! what actually protect the collections.

use voltlane_storefront::session::{Profile, SessionState};

use crate::error::AdminError;

/// Check that the resolved session may use the dashboard.
///
/// A still-loading session is rejected the same way as a non-admin one;
/// callers re-check after the session resolves.
///
/// # Errors
///
/// [`AdminError::Forbidden`] unless the profile is known and carries the
/// admin role.
pub fn require_admin(session: &SessionState) -> Result<(), AdminError> {
    if session.loading || !matches!(&session.profile, Profile::Known(user) if user.is_admin()) {
        return Err(AdminError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voltlane_core::models::User;

    fn user(role: &str) -> User {
        serde_json::from_value(json!({
            "id": "u-1",
            "fullName": "Ada Sparks",
            "email": "ada@example.com",
            "role": role,
            "createdAt": "2026-01-01T00:00:00Z",
        }))
        .expect("user")
    }

    #[test]
    fn only_resolved_admin_profiles_pass() {
        let admin = SessionState {
            profile: Profile::Known(user("admin")),
            loading: false,
        };
        require_admin(&admin).expect("admin passes");

        let customer = SessionState {
            profile: Profile::Known(user("user")),
            loading: false,
        };
        require_admin(&customer).expect_err("customer rejected");

        let loading = SessionState {
            profile: Profile::Known(user("admin")),
            loading: true,
        };
        require_admin(&loading).expect_err("loading rejected");

        let anonymous = SessionState {
            profile: Profile::Anonymous,
            loading: false,
        };
        require_admin(&anonymous).expect_err("anonymous rejected");
    }
}
