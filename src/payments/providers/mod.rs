pub mod khqr;
pub mod source_api;

pub use khqr::{KhqrProvider, KHQR_CHECK_PATH};
pub use source_api::SourceApiProvider;
