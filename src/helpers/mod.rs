//! Helpers shared by the generator, the server and the watch loop

mod date;
mod url;
mod watch;

pub use date::*;
pub use url::*;
pub use watch::*;
