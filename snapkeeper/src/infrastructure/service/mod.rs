mod backup_expiry_runner;

pub use backup_expiry_runner::BackupExpiryRunner;
