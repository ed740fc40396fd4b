// Export all route modules
pub mod campaigns;
pub mod investors;
pub mod matches;

// Re-export all route handlers for easy importing
pub use campaigns::*;
pub use investors::*;
pub use matches::*;
