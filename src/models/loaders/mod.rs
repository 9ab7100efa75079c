pub mod toml_loader;

pub use toml_loader::{load_selection_request, parse_selection_request};
