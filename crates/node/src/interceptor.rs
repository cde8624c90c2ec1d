//! Event interception hook.

use latticebft_events::EventList;
use parking_lot::Mutex;

/// Observer of every event list just before processing.
///
/// Each worker hands the interceptor the plain (follow-up-stripped) list it
/// is about to apply, synchronously and in processing order for that module.
/// Interceptors observe; they never mutate. Used for debugging, tracing and
/// deterministic replay.
pub trait Interceptor: Send + Sync {
    /// Observe a list of events about to be processed.
    fn intercept(&self, events: &EventList);
}

/// Interceptor that records every observed list.
///
/// The replay observer used by the test suite; also handy for ad-hoc
/// debugging of module interactions.
#[derive(Default)]
pub struct RecordingInterceptor {
    records: Mutex<Vec<EventList>>,
}

impl RecordingInterceptor {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in observation order.
    pub fn records(&self) -> Vec<EventList> {
        self.records.lock().clone()
    }

    /// Number of lists recorded so far.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Interceptor for RecordingInterceptor {
    fn intercept(&self, events: &EventList) {
        self.records.lock().push(events.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latticebft_events::factory;

    #[test]
    fn test_recording_interceptor_keeps_order() {
        let recorder = RecordingInterceptor::new();

        recorder.intercept(&EventList::of(factory::testing_uint("m", 1)));
        recorder.intercept(&EventList::of(factory::testing_uint("m", 2)));

        let records = recorder.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 1);
    }
}
