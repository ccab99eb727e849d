pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod refresh;
pub mod render;
pub mod state;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use dashboard::Dashboard;
pub use state::AppState;
