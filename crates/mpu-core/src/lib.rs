pub mod config;
pub mod logging;

pub mod etag;
pub mod power;
pub mod remote;
pub mod transfer;
pub mod verify;
