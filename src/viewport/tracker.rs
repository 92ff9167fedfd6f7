use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use log::{debug, warn};
use thiserror::Error;

use crate::config::TrackerConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("IntersectionObserver is not available")]
    IntersectionUnavailable,
    #[error("javascript error: {0}")]
    Js(String),
}

/// One entry of an intersection callback, reduced to what the tracker needs.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionReport {
    pub section: String,
    pub is_intersecting: bool,
}

/// Scroll flag plus the set of sections seen on screen so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewportState {
    scrolled: bool,
    visible: BTreeSet<String>,
}

impl ViewportState {
    pub fn scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn is_visible(&self, section: &str) -> bool {
        self.visible.contains(section)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Returns true when the flag flipped.
    pub fn apply_scroll(&mut self, offset: f64, threshold: f64) -> bool {
        let scrolled = offset > threshold;
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }

    /// Marks intersecting sections as visible. Never removes anything.
    /// Returns true when the set grew.
    pub fn apply_intersections(&mut self, reports: &[IntersectionReport]) -> bool {
        let mut grew = false;
        for report in reports.iter().filter(|r| r.is_intersecting) {
            if report.section.is_empty() {
                continue;
            }
            grew |= self.visible.insert(report.section.clone());
        }
        grew
    }

    pub fn reveal_all<I>(&mut self, sections: I) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        let mut grew = false;
        for section in sections {
            grew |= self.visible.insert(section);
        }
        grew
    }
}

/// What the tracker needs from its environment. Subscriptions are released
/// when their handles are dropped.
pub trait ViewportHost {
    type ScrollSubscription;
    type SectionWatch;

    fn scroll_to_top(&self);

    fn scroll_offset(&self) -> f64;

    fn on_scroll(&self, callback: Box<dyn FnMut(f64)>) -> Self::ScrollSubscription;

    /// Observes every marked section with the given visible-area threshold.
    fn watch_sections(
        &self,
        threshold: f64,
        callback: Box<dyn FnMut(Vec<IntersectionReport>)>,
    ) -> Result<Self::SectionWatch, ViewportError>;

    /// Ids of every marked section currently in the document.
    fn section_ids(&self) -> Vec<String>;
}

type Notify = Rc<dyn Fn(&ViewportState)>;

struct Subscriptions<H: ViewportHost> {
    live: Rc<Cell<bool>>,
    _scroll: H::ScrollSubscription,
    _watch: Option<H::SectionWatch>,
}

pub struct ViewportTracker<H: ViewportHost> {
    host: H,
    config: TrackerConfig,
    state: Rc<RefCell<ViewportState>>,
    notify: Notify,
    subscriptions: Option<Subscriptions<H>>,
}

impl<H: ViewportHost> ViewportTracker<H> {
    pub fn new<F>(host: H, config: TrackerConfig, notify: F) -> Self
    where
        F: Fn(&ViewportState) + 'static,
    {
        Self {
            host,
            config,
            state: Rc::new(RefCell::new(ViewportState::default())),
            notify: Rc::new(notify),
            subscriptions: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscriptions.is_some()
    }

    pub fn state(&self) -> ViewportState {
        self.state.borrow().clone()
    }

    pub fn start(&mut self) {
        if self.is_running() {
            debug!("viewport tracker already running");
            return;
        }

        *self.state.borrow_mut() = ViewportState::default();
        self.host.scroll_to_top();
        let offset = self.host.scroll_offset();
        self.state
            .borrow_mut()
            .apply_scroll(offset, self.config.scroll_threshold);

        let live = Rc::new(Cell::new(true));

        let scroll = {
            let live = live.clone();
            let state = self.state.clone();
            let notify = self.notify.clone();
            let threshold = self.config.scroll_threshold;
            self.host.on_scroll(Box::new(move |offset: f64| {
                if !live.get() {
                    return;
                }
                let snapshot = {
                    let mut state = state.borrow_mut();
                    if !state.apply_scroll(offset, threshold) {
                        return;
                    }
                    state.clone()
                };
                notify(&snapshot);
            }))
        };

        let watch = {
            let live = live.clone();
            let state = self.state.clone();
            let notify = self.notify.clone();
            self.host.watch_sections(
                self.config.visibility_threshold,
                Box::new(move |reports: Vec<IntersectionReport>| {
                    if !live.get() {
                        return;
                    }
                    let snapshot = {
                        let mut state = state.borrow_mut();
                        if !state.apply_intersections(&reports) {
                            return;
                        }
                        state.clone()
                    };
                    notify(&snapshot);
                }),
            )
        };

        let watch = match watch {
            Ok(watch) => Some(watch),
            Err(err) => {
                warn!("section reveal disabled, showing everything: {}", err);
                self.state.borrow_mut().reveal_all(self.host.section_ids());
                None
            }
        };

        self.subscriptions = Some(Subscriptions {
            live,
            _scroll: scroll,
            _watch: watch,
        });
        debug!(
            "viewport tracker started, {} sections already visible",
            self.state.borrow().visible_count()
        );

        let snapshot = self.state();
        (self.notify)(&snapshot);
    }

    /// Releases both subscriptions. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(subscriptions) = self.subscriptions.take() {
            subscriptions.live.set(false);
            drop(subscriptions);
            debug!("viewport tracker stopped");
        }
    }
}

impl<H: ViewportHost> Drop for ViewportTracker<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type ScrollFn = Box<dyn FnMut(f64)>;
    type WatchFn = Box<dyn FnMut(Vec<IntersectionReport>)>;

    /// In-memory host. Dropping a handle unregisters its callback; queued
    /// callbacks can still be fired through `stale_*` to mimic late delivery.
    #[derive(Default)]
    struct FakeHost {
        offset: Rc<Cell<f64>>,
        scroll_to_top_calls: Rc<Cell<usize>>,
        scroll_listeners: Rc<RefCell<Vec<(usize, Rc<RefCell<ScrollFn>>)>>>,
        watchers: Rc<RefCell<Vec<(usize, f64, Rc<RefCell<WatchFn>>)>>>,
        retired_scroll: Rc<RefCell<Vec<Rc<RefCell<ScrollFn>>>>>,
        retired_watch: Rc<RefCell<Vec<Rc<RefCell<WatchFn>>>>>,
        next_id: Rc<Cell<usize>>,
        no_observer: bool,
        sections: Vec<String>,
    }

    struct ScrollHandle {
        id: usize,
        host: FakeHost,
    }

    impl Drop for ScrollHandle {
        fn drop(&mut self) {
            let mut listeners = self.host.scroll_listeners.borrow_mut();
            if let Some(pos) = listeners.iter().position(|(id, _)| *id == self.id) {
                let (_, callback) = listeners.remove(pos);
                self.host.retired_scroll.borrow_mut().push(callback);
            }
        }
    }

    struct WatchHandle {
        id: usize,
        host: FakeHost,
    }

    impl Drop for WatchHandle {
        fn drop(&mut self) {
            let mut watchers = self.host.watchers.borrow_mut();
            if let Some(pos) = watchers.iter().position(|(id, _, _)| *id == self.id) {
                let (_, _, callback) = watchers.remove(pos);
                self.host.retired_watch.borrow_mut().push(callback);
            }
        }
    }

    impl Clone for FakeHost {
        fn clone(&self) -> Self {
            Self {
                offset: self.offset.clone(),
                scroll_to_top_calls: self.scroll_to_top_calls.clone(),
                scroll_listeners: self.scroll_listeners.clone(),
                watchers: self.watchers.clone(),
                retired_scroll: self.retired_scroll.clone(),
                retired_watch: self.retired_watch.clone(),
                next_id: self.next_id.clone(),
                no_observer: self.no_observer,
                sections: self.sections.clone(),
            }
        }
    }

    impl FakeHost {
        fn with_sections(sections: &[&str]) -> Self {
            Self {
                sections: sections.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        fn next_id(&self) -> usize {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        }

        fn scroll(&self, offset: f64) {
            self.offset.set(offset);
            let listeners: Vec<_> = self
                .scroll_listeners
                .borrow()
                .iter()
                .map(|(_, cb)| cb.clone())
                .collect();
            for listener in listeners {
                (&mut *listener.borrow_mut())(offset);
            }
        }

        fn intersect(&self, reports: Vec<IntersectionReport>) {
            let watchers: Vec<_> = self
                .watchers
                .borrow()
                .iter()
                .map(|(_, _, cb)| cb.clone())
                .collect();
            for watcher in watchers {
                (&mut *watcher.borrow_mut())(reports.clone());
            }
        }

        fn stale_scroll(&self, offset: f64) {
            for listener in self.retired_scroll.borrow().iter() {
                (&mut *listener.borrow_mut())(offset);
            }
        }

        fn stale_intersect(&self, reports: Vec<IntersectionReport>) {
            for watcher in self.retired_watch.borrow().iter() {
                (&mut *watcher.borrow_mut())(reports.clone());
            }
        }

        fn scroll_listener_count(&self) -> usize {
            self.scroll_listeners.borrow().len()
        }

        fn watcher_count(&self) -> usize {
            self.watchers.borrow().len()
        }
    }

    impl ViewportHost for FakeHost {
        type ScrollSubscription = ScrollHandle;
        type SectionWatch = WatchHandle;

        fn scroll_to_top(&self) {
            self.offset.set(0.0);
            self.scroll_to_top_calls.set(self.scroll_to_top_calls.get() + 1);
        }

        fn scroll_offset(&self) -> f64 {
            self.offset.get()
        }

        fn on_scroll(&self, callback: ScrollFn) -> ScrollHandle {
            let id = self.next_id();
            self.scroll_listeners
                .borrow_mut()
                .push((id, Rc::new(RefCell::new(callback))));
            ScrollHandle {
                id,
                host: self.clone(),
            }
        }

        fn watch_sections(
            &self,
            threshold: f64,
            callback: WatchFn,
        ) -> Result<WatchHandle, ViewportError> {
            if self.no_observer {
                return Err(ViewportError::IntersectionUnavailable);
            }
            let id = self.next_id();
            self.watchers
                .borrow_mut()
                .push((id, threshold, Rc::new(RefCell::new(callback))));
            Ok(WatchHandle {
                id,
                host: self.clone(),
            })
        }

        fn section_ids(&self) -> Vec<String> {
            self.sections.clone()
        }
    }

    fn seen(id: &str) -> IntersectionReport {
        IntersectionReport {
            section: id.to_string(),
            is_intersecting: true,
        }
    }

    fn left(id: &str) -> IntersectionReport {
        IntersectionReport {
            section: id.to_string(),
            is_intersecting: false,
        }
    }

    fn tracker_with_log(
        host: FakeHost,
    ) -> (ViewportTracker<FakeHost>, Rc<RefCell<Vec<ViewportState>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let tracker = ViewportTracker::new(host, TrackerConfig::default(), move |state| {
            sink.borrow_mut().push(state.clone())
        });
        (tracker, log)
    }

    #[test]
    fn scroll_threshold_boundary() {
        let mut state = ViewportState::default();
        state.apply_scroll(50.0, 50.0);
        assert!(!state.scrolled());
        state.apply_scroll(50.5, 50.0);
        assert!(state.scrolled());
        state.apply_scroll(0.0, 50.0);
        assert!(!state.scrolled());
    }

    #[test]
    fn scroll_sequence_toggles_flag_both_ways() {
        let host = FakeHost::default();
        let (mut tracker, _) = tracker_with_log(host.clone());
        tracker.start();

        let mut flags = Vec::new();
        for offset in [0.0, 30.0, 60.0, 40.0] {
            host.scroll(offset);
            flags.push(tracker.state().scrolled());
        }
        assert_eq!(flags, vec![false, false, true, false]);
    }

    #[test]
    fn start_scrolls_to_top_and_registers_once() {
        let host = FakeHost::default();
        host.offset.set(400.0);
        let (mut tracker, log) = tracker_with_log(host.clone());

        tracker.start();
        assert_eq!(host.scroll_to_top_calls.get(), 1);
        assert!(!tracker.state().scrolled());
        assert_eq!(host.scroll_listener_count(), 1);
        assert_eq!(host.watcher_count(), 1);
        assert_eq!(log.borrow().len(), 1);

        tracker.start();
        assert_eq!(host.scroll_to_top_calls.get(), 1);
        assert_eq!(host.scroll_listener_count(), 1);
        assert_eq!(host.watcher_count(), 1);
    }

    #[test]
    fn watcher_uses_ten_percent_threshold() {
        let host = FakeHost::default();
        let (mut tracker, _) = tracker_with_log(host.clone());
        tracker.start();
        let threshold = host.watchers.borrow()[0].1;
        assert_eq!(threshold, 0.1);
    }

    #[test]
    fn intersecting_entries_are_latched() {
        let host = FakeHost::default();
        let (mut tracker, _) = tracker_with_log(host.clone());
        tracker.start();

        host.intersect(vec![seen("workflow"), left("benefits")]);
        let state = tracker.state();
        assert!(state.is_visible("workflow"));
        assert!(!state.is_visible("benefits"));

        host.intersect(vec![left("workflow")]);
        assert!(tracker.state().is_visible("workflow"));
    }

    #[test]
    fn notifies_only_on_change() {
        let host = FakeHost::default();
        let (mut tracker, log) = tracker_with_log(host.clone());
        tracker.start();
        let after_start = log.borrow().len();

        host.scroll(10.0);
        host.scroll(20.0);
        assert_eq!(log.borrow().len(), after_start);

        host.scroll(80.0);
        host.scroll(90.0);
        assert_eq!(log.borrow().len(), after_start + 1);

        host.intersect(vec![seen("features")]);
        host.intersect(vec![seen("features")]);
        assert_eq!(log.borrow().len(), after_start + 2);
        assert!(log.borrow().last().unwrap().is_visible("features"));
    }

    #[test]
    fn stop_detaches_everything() {
        let host = FakeHost::default();
        let (mut tracker, log) = tracker_with_log(host.clone());
        tracker.start();
        tracker.stop();

        assert!(!tracker.is_running());
        assert_eq!(host.scroll_listener_count(), 0);
        assert_eq!(host.watcher_count(), 0);

        let before = tracker.state();
        let notified = log.borrow().len();
        host.scroll(500.0);
        host.intersect(vec![seen("benefits")]);
        host.stale_scroll(500.0);
        host.stale_intersect(vec![seen("benefits")]);
        assert_eq!(tracker.state(), before);
        assert_eq!(log.borrow().len(), notified);

        tracker.stop();
    }

    #[test]
    fn drop_detaches_everything() {
        let host = FakeHost::default();
        {
            let (mut tracker, _) = tracker_with_log(host.clone());
            tracker.start();
            assert_eq!(host.scroll_listener_count(), 1);
        }
        assert_eq!(host.scroll_listener_count(), 0);
        assert_eq!(host.watcher_count(), 0);
    }

    #[test]
    fn remount_keeps_single_registration_and_resets_state() {
        let host = FakeHost::default();
        let (mut tracker, _) = tracker_with_log(host.clone());

        tracker.start();
        host.intersect(vec![seen("workflow")]);
        tracker.stop();
        tracker.start();

        assert_eq!(host.scroll_listener_count(), 1);
        assert_eq!(host.watcher_count(), 1);
        assert_eq!(tracker.state().visible_count(), 0);

        host.stale_intersect(vec![seen("usecases")]);
        assert!(!tracker.state().is_visible("usecases"));
        host.intersect(vec![seen("usecases")]);
        assert!(tracker.state().is_visible("usecases"));
    }

    #[test]
    fn missing_observer_reveals_every_section() {
        let mut host = FakeHost::with_sections(&["hero", "workflow", "benefits"]);
        host.no_observer = true;
        let (mut tracker, log) = tracker_with_log(host.clone());
        tracker.start();

        assert!(tracker.is_running());
        assert_eq!(host.watcher_count(), 0);
        assert_eq!(host.scroll_listener_count(), 1);
        let state = tracker.state();
        assert_eq!(state.visible_count(), 3);
        assert!(state.is_visible("benefits"));
        assert_eq!(log.borrow().last(), Some(&state));
    }

    #[test]
    fn blank_section_ids_are_ignored() {
        let mut state = ViewportState::default();
        assert!(!state.apply_intersections(&[seen("")]));
        assert_eq!(state.visible_count(), 0);
    }

    fn arb_report() -> impl Strategy<Value = IntersectionReport> {
        (
            prop::sample::select(vec!["hero", "workflow", "benefits", "usecases", "features"]),
            any::<bool>(),
        )
            .prop_map(|(section, is_intersecting)| IntersectionReport {
                section: section.to_string(),
                is_intersecting,
            })
    }

    proptest! {
        #[test]
        fn scrolled_flag_matches_offset(offset in -1000.0f64..10_000.0) {
            let mut state = ViewportState::default();
            state.apply_scroll(offset, 50.0);
            prop_assert_eq!(state.scrolled(), offset > 50.0);
        }

        #[test]
        fn visibility_never_shrinks(
            batches in prop::collection::vec(prop::collection::vec(arb_report(), 0..6), 0..20)
        ) {
            let host = FakeHost::default();
            let (mut tracker, _) = tracker_with_log(host.clone());
            tracker.start();

            let mut previous = tracker.state();
            for batch in batches {
                host.intersect(batch);
                let current = tracker.state();
                prop_assert!(current.visible.is_superset(&previous.visible));
                previous = current;
            }
        }
    }
}
