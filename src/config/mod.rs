use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod settings;

pub use settings::ServerSettings;

const DEFAULT_DIRECTIVES: &str = "drcs=info,tokio=warn,h2=warn,hyper=warn,reqwest=warn";

/// Initialize logging system with structured output and environment-based level filtering.
/// Output goes to stderr so the stdio transport keeps stdout for framed messages.
/// An explicit `level` replaces the default directives when `RUST_LOG` is unset.
pub fn init_logging_with(level: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => EnvFilter::new(format!("drcs={},tokio=warn,h2=warn,hyper=warn,reqwest=warn", level)),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_names(false)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact(),
        )
        .try_init()?;

    tracing::info!("Structured logging initialized");
    Ok(())
}

/// Initialize logging for testing with reduced verbosity
pub fn init_test_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::new("drcs=debug");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer().compact())
        .try_init()
        .or_else(|_| Ok(())) // Ignore if already initialized
}
