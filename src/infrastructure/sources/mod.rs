pub mod forexprostools_client;

pub use forexprostools_client::{build_request_body, CountryCode, FetcherConfig, ForexprostoolsClient};
