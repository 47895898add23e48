pub mod edit;
pub mod gateway;
pub mod history;
pub mod ids;
pub mod layout;
pub mod model;
pub mod navigation;
pub mod reorganize;
pub mod session;

pub mod app;
pub mod config;
pub mod ui;

// Internal modules
pub mod actions;
pub mod event;

// Re-export commonly used types
pub use app::{AppMode, AppState};
pub use config::AppConfig;
pub use model::{MindMap, Node, NodeId, TopicNode};
pub use navigation::{Command, Selection};
pub use session::Session;
