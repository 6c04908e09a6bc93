use crate::errors::SessionError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Sessions close after this long without activity.
pub const IDLE_TIMEOUT_MINUTES: i64 = 30;

/// Tenant of an account, taken from the first label of its email domain.
pub fn tenant_from_email(email: &str) -> Result<String, SessionError> {
    let invalid = || SessionError::InvalidEmail(email.to_string());
    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    let tenant = domain.split('.').next().unwrap_or_default();
    if local.is_empty() || tenant.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    Ok(tenant.to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub tenant_id: String,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_activity >= Duration::minutes(IDLE_TIMEOUT_MINUTES)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}

/// Open sessions, one per login, keyed by an opaque token.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    /// Starts a session for an authenticated tenant and returns its token.
    pub fn open(&mut self, tenant_id: &str, now: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                tenant_id: tenant_id.to_string(),
                last_activity: now,
            },
        );
        token
    }

    /// Validates the token, records activity on its session and returns the
    /// session's tenant.
    pub fn authorize(&mut self, token: &str, now: DateTime<Utc>) -> Result<String, SessionError> {
        let session = self.sessions.get_mut(token).ok_or(SessionError::Unknown)?;
        if session.is_expired_at(now) {
            self.sessions.remove(token);
            return Err(SessionError::Expired);
        }
        session.touch(now);
        Ok(session.tenant_id.clone())
    }

    pub fn close(&mut self, token: &str) -> Option<Session> {
        self.sessions.remove(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
