use crate::errors::SessionError;
use crate::session::tenant_from_email;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::collections::HashMap;

pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 32;
const HASH_LENGTH: usize = 32;

/// A registered login. Only the salted PBKDF2-SHA256 hash of the password is
/// kept.
#[derive(Debug, Clone)]
pub struct Account {
    pub tenant_id: String,
    salt: [u8; SALT_LENGTH],
    password_hash: [u8; HASH_LENGTH],
}

impl Account {
    fn verify(&self, password: &str, iterations: u32) -> bool {
        hash_password(password, &self.salt, iterations) == self.password_hash
    }
}

#[derive(Debug)]
pub struct AccountStore {
    iterations: u32,
    accounts: HashMap<String, Account>,
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl AccountStore {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
            accounts: HashMap::new(),
        }
    }

    /// Creates an account and returns its tenant.
    pub fn register(&mut self, email: &str, password: &str) -> Result<String, SessionError> {
        let key = account_key(email);
        let tenant_id = tenant_from_email(&key)?;
        if password.is_empty() {
            return Err(SessionError::MissingPassword);
        }
        if self.accounts.contains_key(&key) {
            return Err(SessionError::AlreadyRegistered(key));
        }

        let salt = generate_salt();
        let password_hash = hash_password(password, &salt, self.iterations);
        self.accounts.insert(
            key,
            Account {
                tenant_id: tenant_id.clone(),
                salt,
                password_hash,
            },
        );
        Ok(tenant_id)
    }

    /// Checks a login and returns the account's tenant. Unknown emails and
    /// wrong passwords fail the same way.
    pub fn verify(&self, email: &str, password: &str) -> Result<String, SessionError> {
        self.accounts
            .get(&account_key(email))
            .filter(|account| account.verify(password, self.iterations))
            .map(|account| account.tenant_id.clone())
            .ok_or(SessionError::InvalidCredentials)
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn hash_password(password: &str, salt: &[u8; SALT_LENGTH], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
