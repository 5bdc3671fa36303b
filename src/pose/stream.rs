//! Per-tracker feature buffers.
//!
//! One [`TrackerStream`] per slot collects the normalized feature vectors of
//! one recognition session. The buffers are owned exclusively by the engine
//! and cleared at the next session start, never in between.

use crate::pose::types::{FeatureVector, TrackerSlot, TRACKER_COUNT};

/// Feature vectors collected for one tracker during one recognition session.
#[derive(Debug, Clone, Default)]
pub struct TrackerStream {
    samples: Vec<FeatureVector>,
}

impl TrackerStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: FeatureVector) {
        self.samples.push(feature);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[FeatureVector] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// The fixed set of per-slot streams owned by one recognition session.
#[derive(Debug, Clone, Default)]
pub struct TrackerStreams {
    streams: [TrackerStream; TRACKER_COUNT],
}

impl TrackerStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: TrackerSlot) -> &TrackerStream {
        &self.streams[slot.index()]
    }

    pub fn get_mut(&mut self, slot: TrackerSlot) -> &mut TrackerStream {
        &mut self.streams[slot.index()]
    }

    /// Clear every slot's buffer at recognition-session start.
    pub fn clear_all(&mut self) {
        for stream in &mut self.streams {
            stream.clear();
        }
    }

    /// Total buffered samples across all slots.
    pub fn total_samples(&self) -> usize {
        self.streams.iter().map(TrackerStream::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::types::FEATURE_DIMS;

    fn make_feature(index: u64) -> FeatureVector {
        FeatureVector::new(index, [index as f64; FEATURE_DIMS])
    }

    #[test]
    fn test_stream_starts_empty() {
        let stream = TrackerStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.len(), 0);
    }

    #[test]
    fn test_stream_preserves_order() {
        let mut stream = TrackerStream::new();
        stream.push(make_feature(0));
        stream.push(make_feature(1));
        stream.push(make_feature(2));
        let indices: Vec<u64> = stream.samples().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_stream_clear() {
        let mut stream = TrackerStream::new();
        stream.push(make_feature(0));
        stream.clear();
        assert!(stream.is_empty());
    }

    #[test]
    fn test_streams_are_independent_per_slot() {
        let mut streams = TrackerStreams::new();
        streams.get_mut(TrackerSlot::Hip).push(make_feature(0));
        streams.get_mut(TrackerSlot::Hip).push(make_feature(1));
        streams.get_mut(TrackerSlot::Head).push(make_feature(2));

        assert_eq!(streams.get(TrackerSlot::Hip).len(), 2);
        assert_eq!(streams.get(TrackerSlot::Head).len(), 1);
        assert!(streams.get(TrackerSlot::LeftFoot).is_empty());
        assert_eq!(streams.total_samples(), 3);
    }

    #[test]
    fn test_clear_all_empties_every_slot() {
        let mut streams = TrackerStreams::new();
        for slot in TrackerSlot::ALL {
            streams.get_mut(slot).push(make_feature(slot.index() as u64));
        }
        assert_eq!(streams.total_samples(), TRACKER_COUNT);

        streams.clear_all();
        assert_eq!(streams.total_samples(), 0);
        for slot in TrackerSlot::ALL {
            assert!(streams.get(slot).is_empty());
        }
    }
}
