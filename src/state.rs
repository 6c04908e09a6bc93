use crate::accounts::AccountStore;
use crate::models::Record;
use crate::rates::RevenueRateTable;
use crate::session::SessionStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub records_path: PathBuf,
    pub records: Arc<RwLock<Vec<Record>>>,
    pub rates: Arc<RevenueRateTable>,
    pub accounts: Arc<Mutex<AccountStore>>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(
        records_path: PathBuf,
        records: Vec<Record>,
        rates: RevenueRateTable,
        accounts: AccountStore,
    ) -> Self {
        Self {
            records_path,
            records: Arc::new(RwLock::new(records)),
            rates: Arc::new(rates),
            accounts: Arc::new(Mutex::new(accounts)),
            sessions: Arc::new(Mutex::new(SessionStore::default())),
        }
    }
}
