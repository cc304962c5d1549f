#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod actions;
pub mod config;
pub mod error;
pub mod gateway;
pub mod packet;
pub mod platform;
pub mod store;

pub use config::Config;
