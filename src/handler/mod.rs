pub mod definition;
pub mod references;

pub use definition::goto_resource_definition;
pub use references::{ReferencesHandler, TEMPLATE_GLOB};
