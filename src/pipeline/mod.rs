//! The segment capture-and-dispatch pipeline core: size filtering, the
//! single-worker dispatch queue, the bounded result timeline and the
//! recording status machine.

mod dispatch;
mod events;
mod filter;
mod segment;
mod status;
mod timeline;

pub use dispatch::{DispatchQueue, DispatchTuning};
pub use events::{DispatchEvent, PresentationUpdate};
pub use filter::SegmentFilter;
pub use segment::Segment;
pub use status::{Activity, RecordingStatus};
pub use timeline::{EmotionTimeline, TimelineEntry};
