pub mod http;
pub mod logging;
pub mod summary;
pub mod utils;
