use tracing::debug;

use super::segment::Segment;

/// Minimum-size gate in front of the classifier.
///
/// Segments below the threshold are presumed silence or encoder artifacts
/// and are not worth a remote call. Applied once at ingestion and again by
/// the queue worker, since segments can be enqueued from more than one call
/// site.
#[derive(Debug, Clone, Copy)]
pub struct SegmentFilter {
    min_bytes: usize,
}

impl SegmentFilter {
    pub fn new(min_bytes: usize) -> Self {
        Self { min_bytes }
    }

    pub fn accepts(&self, segment: &Segment) -> bool {
        let ok = segment.size_bytes() >= self.min_bytes;
        if !ok {
            debug!(
                "Discarding undersized segment ({} < {} bytes)",
                segment.size_bytes(),
                self.min_bytes
            );
        }
        ok
    }

    pub fn min_bytes(&self) -> usize {
        self.min_bytes
    }
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self { min_bytes: 5000 }
    }
}
