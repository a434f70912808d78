pub mod audio;
pub mod constants;
pub mod device_manager;
pub mod error;
pub mod factory;
pub mod filter;
pub mod frame;
pub mod playback;
pub mod producer;
pub mod profile;
