// Adapters layer: concrete implementations of the domain ports for real processes and HTTP.

pub mod http;
pub mod process;

pub use http::ReqwestProber;
pub use process::SystemRunner;
