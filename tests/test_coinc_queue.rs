//! Integration tests for the coincidence queue
//!
//! Drives `CoincidenceQueue` through the public API only:
//! - Eviction when a far-future event arrives
//! - Single event drained by an unbounded flush
//! - Flush completeness for arbitrary starting sizes
//! - Bounded flush that runs out of time and discards the remainder
//! - Diagnostics accumulated across pushes and flushes

#[cfg(test)]
mod coinc_queue_tests {
    use coincflow::coinc_core::{
        CoincHandler, CoincidenceQueue, CollectingHandler, Diagnostics, FlushTimeout, Source,
        TimestampedEvent, TriggerEvent, HEAD_EVENT_ID, TAIL_EVENT_ID,
    };
    use std::thread;
    use std::time::{Duration, Instant};

    type Queue = CoincidenceQueue<TriggerEvent, CollectingHandler<TriggerEvent>>;

    fn queue(window: f64) -> Queue {
        CoincidenceQueue::new(window, CollectingHandler::new()).unwrap()
    }

    fn pairs(q: &Queue) -> Vec<(f64, f64)> {
        q.handler()
            .coincidences
            .iter()
            .map(|c| (c.first.trigger_time_us, c.other.trigger_time_us))
            .collect()
    }

    #[test]
    fn test_far_future_push_retires_earliest_with_partners() {
        let mut q = queue(3.0);
        for t in [0.0, 1.0, 2.0] {
            let report = q.push(TriggerEvent::new(Source::Head, 0, t), None).unwrap();
            assert_eq!(report.retired, 0);
        }
        assert!(q.handler().singles.is_empty());

        q.push(TriggerEvent::new(Source::Tail, 0, 10.0), None).unwrap();

        // 0 went first, paired with 1 and 2, then reported as a single
        let all = pairs(&q);
        assert_eq!(&all[..2], &[(0.0, 1.0), (0.0, 2.0)]);
        assert_eq!(q.handler().singles[0].trigger_time_us, 0.0);
        assert!(q.span() < q.window());
    }

    #[test]
    fn test_single_event_unbounded_flush() {
        let mut q = queue(3.0);
        q.push(TriggerEvent::new(Source::Head, 7, 42.0), None).unwrap();

        let report = q.flush(FlushTimeout::from_secs(-1), None);

        assert_eq!(report.retired, 1);
        assert!(!report.timed_out);
        assert_eq!(q.handler().singles.len(), 1);
        assert_eq!(q.handler().singles[0].serial, 7);
        assert!(q.handler().coincidences.is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn test_flush_completeness() {
        for n in [0usize, 1, 2, 17, 500] {
            let mut q = queue(1_000_000.0);
            for i in 0..n {
                q.push(TriggerEvent::new(Source::Tail, i as u64, i as f64), None)
                    .unwrap();
            }
            assert_eq!(q.len(), n);

            let report = q.flush(FlushTimeout::from_secs(0), None);
            assert_eq!(report.retired, n);
            assert_eq!(report.discarded, 0);
            assert!(q.is_empty(), "queue of {} not drained", n);
            assert_eq!(q.handler().singles.len(), n);
        }
    }

    /// Handler that takes a while per single, so a flush can run out of time
    #[derive(Default)]
    struct SlowHandler {
        singles: usize,
        coincidences: usize,
        timeouts: Vec<(Duration, usize)>,
    }

    impl CoincHandler<TriggerEvent> for SlowHandler {
        fn handle_single(&mut self, _event: TriggerEvent) {
            self.singles += 1;
            thread::sleep(Duration::from_millis(20));
        }

        fn handle_coinc(&mut self, _first: &TriggerEvent, _other: &TriggerEvent) {
            self.coincidences += 1;
        }

        fn flush_timeout(&mut self, max_time: Duration, skipped: usize) {
            self.timeouts.push((max_time, skipped));
        }
    }

    #[test]
    fn test_bounded_flush_discards_remainder() {
        let mut q = CoincidenceQueue::new(1.0, SlowHandler::default()).unwrap();
        for i in 0..10u64 {
            q.push(TriggerEvent::new(Source::Head, i, i as f64 * 0.05), None)
                .unwrap();
        }
        assert_eq!(q.len(), 10);

        let budget = Duration::from_millis(50);
        let started = Instant::now();
        let report = q.flush(FlushTimeout::Within(budget), None);
        let elapsed = started.elapsed();

        assert!(report.timed_out);
        assert!(report.discarded > 0);
        assert_eq!(report.retired + report.discarded, 10);
        assert!(q.is_empty());
        // One retirement may still be in flight when the deadline passes
        assert!(elapsed < budget + Duration::from_millis(500));

        let h = q.handler();
        assert_eq!(h.singles, report.retired);
        assert_eq!(h.timeouts, vec![(budget, report.discarded)]);
    }

    #[test]
    fn test_diagnostics_across_push_and_flush() {
        let mut q = queue(2.0);
        let mut d = Diagnostics::new();

        let events = [
            (Source::Head, 0.0),
            (Source::Tail, 1.5),
            (Source::Head, 10.0),
            (Source::Tail, 11.0),
            (Source::Head, 30.0),
        ];
        for (source, t) in events {
            q.push(TriggerEvent::new(source, 0, t), Some(&mut d)).unwrap();
        }
        q.flush(FlushTimeout::Unbounded, Some(&mut d));

        assert_eq!(d.size, 0);
        assert_eq!(d.n_coinc, 2);
        assert_eq!(d.n_singles[HEAD_EVENT_ID as usize], 3);
        assert_eq!(d.n_singles[TAIL_EVENT_ID as usize], 2);
        assert_eq!(d.total_singles(), 5);
        assert_eq!(pairs(&q), vec![(0.0, 1.5), (10.0, 11.0)]);

        d.reset();
        assert_eq!(d, Diagnostics::default());
    }

    /// Event type with an arbitrary category, to reach the out-of-range path
    #[derive(Debug, Clone)]
    struct Tagged {
        t: f64,
        id: i32,
    }

    impl TimestampedEvent for Tagged {
        fn trigger_time(&self) -> f64 {
            self.t
        }

        fn category_id(&self) -> i32 {
            self.id
        }
    }

    #[test]
    fn test_out_of_range_category_still_retired() {
        let mut q: CoincidenceQueue<Tagged, CollectingHandler<Tagged>> =
            CoincidenceQueue::new(1.0, CollectingHandler::new()).unwrap();
        let mut d = Diagnostics::new();

        q.push(Tagged { t: 0.0, id: 99 }, Some(&mut d)).unwrap();
        q.push(Tagged { t: 0.5, id: -1 }, Some(&mut d)).unwrap();
        q.push(Tagged { t: 5.0, id: 2 }, Some(&mut d)).unwrap();
        q.flush(FlushTimeout::Unbounded, Some(&mut d));

        assert_eq!(q.handler().singles.len(), 3);
        assert_eq!(d.n_coinc, 1);
        assert_eq!(d.total_singles(), 1);
        assert_eq!(d.n_singles[2], 1);
    }
}
