//! Cross-module tests for the sampling engine
//!
//! Tests are organized by topic:
//! - `sampling` - Growth coefficients and static distribution draws
//! - `caching` - Single-draw contract of parameters
//! - `time_series` - Growth policies, grouping, units and negative-value warnings
//! - `repository` - Scenario fallback, attribute inheritance and tag lookup
//! - `loading` - Definition rows through the repository to samples

mod loading;
mod time_series;

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects the messages of `WARN` events
#[derive(Clone, Default)]
struct WarningLayer(Arc<Mutex<Vec<String>>>);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for WarningLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.0);
        }
    }
}

/// Run `f` and return its result with every warning it logged
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let layer = WarningLayer::default();
    let subscriber = Registry::default().with(layer.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    let warnings = layer.0.lock().unwrap().clone();
    (out, warnings)
}
