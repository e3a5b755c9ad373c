pub mod messages;
pub mod module;
pub mod registry;
pub mod settings;

pub use messages::{BundleMessageSource, MessageSource};
pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
