#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod blog;
pub mod composer;
pub mod config;
pub mod feed;
pub mod locale;
pub mod logging;
pub mod markup;
pub mod model;
pub mod pager;
pub mod render;
pub mod service;
pub mod surface;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
