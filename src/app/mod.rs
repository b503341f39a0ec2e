pub mod cards;
pub mod errors;
pub mod hub;
pub mod session;

pub use cards::{BrowseMode, BrowseResponse, SavedTool, ToolCard};
pub use errors::AppError;
pub use hub::ToolHub;
pub use session::SessionStore;
