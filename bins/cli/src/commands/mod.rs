//! Local CLI command handlers.

pub mod info;
pub mod lookup;
pub mod probe;
pub mod serve;
pub mod students;

pub use info::run_info;
pub use lookup::{LookupCommandInput, run_lookup};
pub use probe::run_probe;
pub use serve::run_serve;
pub use students::run_students;
