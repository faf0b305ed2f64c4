pub mod fetch;
pub mod session;

pub use fetch::{DataFetcher, FsFetcher};
pub use session::{DatasetSession, SessionStatus};

#[cfg(feature = "http-fetch")]
pub use fetch::HttpFetcher;
