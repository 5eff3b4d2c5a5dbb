pub mod extractor;
pub mod fetcher;

pub use extractor::SelectorExtractor;
pub use fetcher::{DEFAULT_FETCH_TIMEOUT, ReqwestFetcher};
