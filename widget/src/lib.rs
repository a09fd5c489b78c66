// Forbid accidental stdout/stderr writes in the widget library.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod editor;
mod events;
mod field;
mod normalize;
mod options;
mod popup;
mod registry;
mod render;
mod validation;

pub use editor::ERROR_TIMEOUT;
pub use editor::TagEditor;
pub use events::TagEvent;
pub use normalize::normalize;
pub use options::TagEditorOptions;
pub use registry::EditorRegistry;
pub use registry::HostId;
pub use render::Renderable;
pub use validation::RejectReason;
pub use validation::validate;
