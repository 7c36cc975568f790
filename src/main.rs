use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tapflash=info")),
        )
        .init();

    tapflash::run(
        tapflash::WindowConfig::default(),
        tapflash::VisualizerConfig::default(),
    )
}
