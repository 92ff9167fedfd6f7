use gloo_events::EventListener;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Reflect};
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::config::SECTION_ATTRIBUTE;
use crate::viewport::tracker::{IntersectionReport, ViewportError, ViewportHost};

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

fn js_error(value: JsValue) -> ViewportError {
    ViewportError::Js(format!("{:?}", value))
}

fn section_selector() -> String {
    format!("[{}]", SECTION_ATTRIBUTE)
}

pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new() -> Result<Self, ViewportError> {
        let window = web_sys::window().ok_or(ViewportError::NoWindow)?;
        let document = window.document().ok_or(ViewportError::NoDocument)?;
        Ok(Self { window, document })
    }

    fn marked_sections(&self) -> Result<Vec<Element>, ViewportError> {
        let nodes = self
            .document
            .query_selector_all(&section_selector())
            .map_err(js_error)?;
        Ok((0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }
}

/// Live IntersectionObserver. Disconnects when dropped.
pub struct SectionWatch {
    observer: IntersectionObserver,
    _callback: ObserverCallback,
}

impl Drop for SectionWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

impl ViewportHost for BrowserHost {
    type ScrollSubscription = EventListener;
    type SectionWatch = SectionWatch;

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn on_scroll(&self, mut callback: Box<dyn FnMut(f64)>) -> EventListener {
        let window = self.window.clone();
        EventListener::new(&self.window, "scroll", move |_event| {
            callback(window.scroll_y().unwrap_or(0.0));
        })
    }

    fn watch_sections(
        &self,
        threshold: f64,
        mut callback: Box<dyn FnMut(Vec<IntersectionReport>)>,
    ) -> Result<SectionWatch, ViewportError> {
        let supported = Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        if !supported {
            return Err(ViewportError::IntersectionUnavailable);
        }

        let on_entries: ObserverCallback = Closure::wrap(Box::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let reports = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionReport {
                        section: entry
                            .target()
                            .get_attribute(SECTION_ATTRIBUTE)
                            .unwrap_or_default(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect();
                callback(reports);
            },
        )
            as Box<dyn FnMut(Array, IntersectionObserver)>);

        let mut init = IntersectionObserverInit::new();
        init.threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(on_entries.as_ref().unchecked_ref(), &init)
                .map_err(js_error)?;

        let watch = SectionWatch {
            observer,
            _callback: on_entries,
        };
        for element in self.marked_sections()? {
            watch.observer.observe(&element);
        }
        Ok(watch)
    }

    fn section_ids(&self) -> Vec<String> {
        self.marked_sections()
            .unwrap_or_default()
            .iter()
            .filter_map(|element| element.get_attribute(SECTION_ATTRIBUTE))
            .collect()
    }
}
