pub mod json;
pub mod path;
pub mod query;
pub mod valid;

pub use json::Json;
pub use path::Path;
pub use query::Query;
pub use valid::Valid;
