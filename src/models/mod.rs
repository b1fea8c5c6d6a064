/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// It includes the reviewable study items, their immutable attempt records, and
/// the content units that anchor items together, as well as methods for
/// creating and manipulating these models.

// Re-export all model types
mod attempt;
pub use attempt::{Attempt, Rating};

mod study_item;
pub use study_item::{ItemKind, StudyItem};

mod content_unit;
pub use content_unit::ContentUnit;
