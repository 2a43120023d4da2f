use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use slog::{o, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, TermDecorator};
use std::time::Instant;

/// Configuration for setting up the logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

/// Sets up the root logger handed to every service at construction.
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = {
        let builder = TermDecorator::new();
        let builder = if config.use_color {
            builder.force_color()
        } else {
            builder
        };
        builder.build()
    };

    let drain = FullFormat::new(decorator).build().fuse();

    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// A logger that drops every record; used by tests and embedded callers.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// Logs one line per handled request.
pub async fn logging_middleware(
    State(logger): State<Logger>,
    req: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = crate::tracing::current_request_id()
        .map(|rid| rid.to_string())
        .unwrap_or_default();

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let duration_ms = start_time.elapsed().as_millis() as u64;

    if status >= 500 {
        slog::error!(
            logger,
            "HTTP request failed";
            "method" => method,
            "path" => path,
            "status" => status,
            "duration_ms" => duration_ms,
            "request_id" => request_id,
        );
    } else {
        slog::info!(
            logger,
            "HTTP request handled";
            "method" => method,
            "path" => path,
            "status" => status,
            "duration_ms" => duration_ms,
            "request_id" => request_id,
        );
    }

    response
}
