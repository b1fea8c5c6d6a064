/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling into the store and the engine
/// modules, and returning a properly formatted response.

mod import_handlers;
mod item_handlers;
mod review_handlers;
mod unit_handlers;

// Re-export all handlers
pub use import_handlers::*;
pub use item_handlers::*;
pub use review_handlers::*;
pub use unit_handlers::*;
