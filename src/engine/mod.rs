pub mod config;
pub mod countdown;
pub mod machine;
pub mod models;
pub mod notifier;
pub mod session;
pub mod settings;
pub mod simulator;
