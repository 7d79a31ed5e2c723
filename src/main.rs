use stemview::{app, config, logging};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let config = config::load_or_default()?;
    tracing::info!(
        resolution = config.resolution.get(),
        height_px = config.height_px,
        "Starting stemview"
    );

    app::run(config)?;
    Ok(())
}
