// Library surface for the binary and headless integration tests.
pub mod analytics;
pub mod app;
pub mod app_dirs;
pub mod banner;
pub mod choices;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod daily;
pub mod error;
pub mod mode;
pub mod provider;
pub mod record;
pub mod results;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod share;
pub mod storage;
pub mod ui;
pub mod util;
