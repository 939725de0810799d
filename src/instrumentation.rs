use std::{future::Future, io::IsTerminal, time::Instant};

use tracing::{Instrument, Span};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utilities::friendly_id;

/// Installs a global subscriber. Meant for binaries embedding the client, the
/// library itself only emits events.
pub fn setup(directives: &[String]) -> anyhow::Result<()> {
    let filter = filter_layer(directives)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(
            fmt::Layer::new()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .compact()
                .without_time()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()?;

    Ok(())
}

pub(crate) fn filter_layer(directives: &[String]) -> anyhow::Result<EnvFilter> {
    let mut layer = EnvFilter::default();

    for directive in directives {
        layer = layer.add_directive(directive.parse()?);
    }

    Ok(layer)
}

fn operation_span(operation: &'static str) -> Span {
    tracing::span!(
        tracing::Level::INFO,
        "operation",
        id = %friendly_id(8),
        operation,
        server = tracing::field::Empty,
        latency = tracing::field::Empty,
    )
}

pub(crate) fn record_server(server: &str) {
    Span::current().record("server", tracing::field::display(server));
}

fn record_latency(started: Instant) {
    Span::current().record(
        "latency",
        tracing::field::display(format!("{}ms", started.elapsed().as_millis())),
    );
    tracing::trace!("finished");
}

/// Runs one client operation inside its own span and records how long it took.
pub(crate) async fn traced<F, T>(operation: &'static str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    async move {
        let out = fut.await;
        record_latency(started);
        out
    }
    .instrument(operation_span(operation))
    .await
}
