pub mod config_io;
pub mod memory_transport;
pub mod retry;
pub mod settings_store;
pub mod state_file;
pub mod transport;
