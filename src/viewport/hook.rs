use log::warn;
use yew::prelude::*;

use crate::config::TrackerConfig;
use crate::viewport::browser::BrowserHost;
use crate::viewport::tracker::{ViewportState, ViewportTracker};

/// Runs a browser-backed tracker for as long as the calling component is
/// mounted and re-renders it whenever the tracked state changes.
#[hook]
pub fn use_viewport(config: TrackerConfig) -> ViewportState {
    let state = use_state(ViewportState::default);

    {
        let setter = state.setter();
        use_effect_with_deps(
            move |config: &TrackerConfig| {
                let tracker = match BrowserHost::new() {
                    Ok(host) => {
                        let mut tracker = ViewportTracker::new(host, *config, move |s: &ViewportState| {
                            setter.set(s.clone())
                        });
                        tracker.start();
                        Some(tracker)
                    }
                    Err(err) => {
                        warn!("viewport tracking unavailable: {}", err);
                        None
                    }
                };

                move || {
                    if let Some(mut tracker) = tracker {
                        tracker.stop();
                    }
                }
            },
            config,
        );
    }

    (*state).clone()
}
