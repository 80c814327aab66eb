mod app;
pub mod binding;
pub mod clients;
pub mod commands;
pub mod config;
pub mod error;
pub mod resource_id;
pub mod schema;
pub mod state;
pub mod validate;

// Re-export App and Config from modules
pub use app::App;
pub use config::Config;

// Disable colors for all tests to get clean output
#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    colored::control::set_override(false);
}
