//! Browser implementations of the lanshan-core ports.

pub mod http;
pub mod persistence;
pub mod storage;
pub mod timer;

pub use http::FetchHttp;
pub use persistence::StorageRepository;
pub use timer::GlooTimer;
