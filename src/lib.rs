pub mod config;
pub mod error;
pub mod fade;
pub mod highlight;
pub mod logging;
pub mod map;
pub mod models;
pub mod park;
pub mod provider;
pub mod script;
pub mod selection;
pub mod session;
pub mod share;
pub mod sketch;
pub mod table;
pub mod traits;
pub mod utils;

pub use config::{Config, Source};
pub use error::{InitError, QueryError};
pub use map::{ParkMap, Platform};
pub use selection::{SelectionChange, SelectionStore};
pub use session::Session;
