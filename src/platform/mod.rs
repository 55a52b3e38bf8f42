//! Platform collaborators: where input comes from and where frames go.

pub mod backend;
pub mod headless;
pub mod terminal;

pub use backend::Backend;
pub use headless::HeadlessBackend;
pub use terminal::TerminalBackend;
