mod models;
pub mod utils;

pub use models::*;
pub use utils::*;
pub mod errors;
pub mod sink;
pub mod source;
pub mod store;
pub mod table;
pub mod transform;
