#![allow(async_fn_in_trait)]
pub mod config;
pub mod error;
pub mod fetch;
pub mod filenames;
pub mod http;
pub mod layout;
pub mod logging;
pub mod time_code;
pub mod video;
