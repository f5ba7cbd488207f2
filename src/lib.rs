pub mod configuration;
pub use configuration::*;

pub mod data_capture;
pub use data_capture::*;

pub mod error_handling;

pub mod host;
pub use host::FlowHook;

pub mod network;
pub use network::*;

pub mod storage;
pub use storage::*;
