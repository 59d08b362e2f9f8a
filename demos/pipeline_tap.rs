//! Minimal enrichment tap — demonstrates the interceptor API.
//!
//! ```bash
//! cargo run --example pipeline_tap
//! ```

use bytes::Bytes;
use jalki::{InterceptorRegistry, Message, TRACE_ENRICHER};
use opentelemetry::trace::{TraceContextExt, Tracer, TracerProvider};
use opentelemetry::Context;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("pipeline");

    let registry = InterceptorRegistry::with_defaults();
    let chain = registry.chain(&[TRACE_ENRICHER])?;

    for (endpoint, body) in [("jms:orders", "order 42 placed"), ("http:ingest", "hello")] {
        let span = tracer.start("route-message");
        let cx = Context::current_with_span(span);

        let msg = Message::new(Bytes::from(body)).with_endpoint(endpoint);
        chain.process(&cx, &msg);
    }

    for span in exporter.get_finished_spans()? {
        for event in &span.events.events {
            println!("{} {:?}", event.name, event.attributes);
        }
    }

    Ok(())
}
