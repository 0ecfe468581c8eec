pub mod backend;
pub mod config;
pub mod context_lines;
pub mod errors;
pub mod gateway;
pub mod hybrid;
pub mod line_range;
pub mod path_validation;
pub mod pattern;
pub mod replace;
pub mod response_formatter;
pub mod search;
pub mod tool_router;
pub mod tools;
pub mod types;
pub mod viewer;
pub mod widget_service;

// Re-export commonly used types
pub use types::*;
pub use widget_service::{Backends, WidgetService};
