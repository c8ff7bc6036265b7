pub mod history;
pub mod log_scan;
pub mod persistence;
pub mod state;

pub use history::HistoryStore;
pub use log_scan::{LogScanner, ScanStats};
pub use persistence::{FileBackend, PersistenceBackend, PersistenceConfig, PersistenceError};
pub use state::StateStore;
