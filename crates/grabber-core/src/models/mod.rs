//! Data models for the application
//!
//! Value objects exchanged between the resolver, the pipelines and the HTTP surface.

mod download;
mod platform;
mod rate_limit;
mod video;
mod video_url;

pub use download::*;
pub use platform::*;
pub use rate_limit::*;
pub use video::*;
pub use video_url::*;
