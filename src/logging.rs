//! Diagnostic sink for the library.
//!
//! Everything logs through `tracing`. Natively a `fmt` subscriber writes to
//! stderr; in the browser a registry layer forwards events to the devtools
//! console.

#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let _ = tracing_subscriber::registry()
        .with(console::ConsoleLayer)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::fmt::Write;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};

    pub struct ConsoleLayer;

    #[derive(Default)]
    struct MessageVisitor {
        line: String,
    }

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                let _ = write!(self.line, "{:?}", value);
            } else {
                let _ = write!(self.line, " {}={:?}", field.name(), value);
            }
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "message" {
                self.line.push_str(value);
            } else {
                let _ = write!(self.line, " {}={}", field.name(), value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for ConsoleLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            let metadata = event.metadata();
            let line = format!("[{}] {}: {}", metadata.level(), metadata.target(), visitor.line);
            let value = wasm_bindgen::JsValue::from_str(&line);
            match *metadata.level() {
                Level::ERROR => web_sys::console::error_1(&value),
                Level::WARN => web_sys::console::warn_1(&value),
                Level::INFO => web_sys::console::info_1(&value),
                _ => web_sys::console::log_1(&value),
            }
        }
    }
}
