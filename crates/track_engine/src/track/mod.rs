mod header;
mod stream;
mod types;

pub use header::TrackHeader;
pub use stream::{TrackReader, TrackWriter};
pub use types::{Frame, Geometry, TrackError, MAX_TRACK_WIDTH, MIN_TRACK_WIDTH};
