mod traits;

pub use traits::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};
