pub mod assess;
pub mod backup_exchange;
pub mod children;
pub mod core;
pub mod submissions;
