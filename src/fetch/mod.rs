mod fetcher;
mod source;

pub use fetcher::{Fetch, Fetcher, MemFetcher};
pub use source::{Format, Source};
