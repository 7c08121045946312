use tracing::{info, warn};

use crate::domain::errors::{PortalError, PortalResult};
use crate::domain::models::caller::Caller;
use crate::storage::{ProfileRepository, SessionRepository};

/// Resolves the caller behind a session token and checks the admin flag.
///
/// Nothing is cached: the session and the profile are read again for every
/// request, so a revoked session or a demoted admin takes effect on the very
/// next call.
#[derive(Clone)]
pub struct AuthorizationGate {
    sessions: SessionRepository,
    profiles: ProfileRepository,
}

impl AuthorizationGate {
    pub fn new(sessions: SessionRepository, profiles: ProfileRepository) -> Self {
        Self { sessions, profiles }
    }

    /// Resolve a signed-in caller from an optional session token
    pub async fn authenticate(&self, token: Option<&str>) -> PortalResult<Caller> {
        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => return Err(PortalError::Unauthenticated),
        };

        let user_id = match self.sessions.find_user_id(token).await? {
            Some(user_id) => user_id,
            None => {
                info!("Rejected unknown session token");
                return Err(PortalError::Unauthenticated);
            }
        };

        // A session whose profile is gone is treated as no session at all
        let is_admin = match self.profiles.is_admin(&user_id).await? {
            Some(flag) => flag,
            None => {
                warn!("Session for {} has no profile", user_id);
                return Err(PortalError::Unauthenticated);
            }
        };

        Ok(Caller { user_id, is_admin })
    }

    /// Resolve the caller and require the admin flag
    pub async fn require_admin(&self, token: Option<&str>) -> PortalResult<Caller> {
        let caller = self.authenticate(token).await?;
        if !caller.is_admin {
            info!("Caller {} is not an administrator", caller.user_id);
            return Err(PortalError::Forbidden);
        }
        Ok(caller)
    }

    /// Revoke the presented session. Signing out without a live session is not an error.
    pub async fn sign_out(&self, token: Option<&str>) -> PortalResult<bool> {
        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => return Ok(false),
        };

        let revoked = self.sessions.delete_session(token).await?;
        if revoked {
            info!("Session revoked");
        }
        Ok(revoked)
    }
}
