pub mod accounts;
pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod range;
pub mod rates;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;
pub mod view;

pub use accounts::AccountStore;
pub use aggregate::aggregate;
pub use app::router;
pub use config::Config;
pub use rates::RevenueRateTable;
pub use state::AppState;
pub use storage::load_records;
