/// Authenticated caller, attached to request extensions by the API's auth layer
///
/// Handlers read it with Axum's `Extension` extractor:
///
/// ```
/// use gauss_shared::auth::context::AuthContext;
///
/// fn owner_filter(auth: &AuthContext) -> String {
///     format!("user_id = '{}'", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Access token used for this request; logout revokes exactly this one
    pub token_id: Uuid,
}

impl AuthContext {
    /// Builds the context from validated token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            token_id: claims.jti,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_context_from_claims() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), Duration::hours(1));
        let context = AuthContext::from_claims(&claims);

        assert_eq!(context.user_id, claims.sub);
        assert_eq!(context.token_id, claims.jti);
    }
}
