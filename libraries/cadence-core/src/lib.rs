//! Cadence Core
//!
//! Platform-agnostic domain types shared by the playback core, the server
//! client and the applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track` and `TrackId`
//! - **Core Traits**: `TrackSource`, the playlist source contract
//! - **Error Handling**: `LoadError` for playlist loading failures
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Track, TrackId};
//!
//! let track = Track::new(
//!     TrackId::new("42"),
//!     "Jam Jam",
//!     "Baaba Maal",
//!     "https://cdn.example.com/songs/42.mp3",
//! )
//! .with_artwork("https://cdn.example.com/covers/42.jpg");
//!
//! assert_eq!(track.id.as_str(), "42");
//! assert!(track.artwork_url.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LoadError, Result};
pub use traits::TrackSource;
pub use types::{Track, TrackId};
