use clap::Parser;
use tracing::info;
use turnkit::cli::{self, Cli};
use turnkit::{init_logging, BUILD_DATE, VERSION};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;

    let config = cli::load_config(&cli)?;
    if cli.list_templates {
        for id in config.templates.ids() {
            println!("{}", id);
        }
        return Ok(());
    }

    info!("TurnKit {} (built {})", VERSION, BUILD_DATE);
    let mut engine = cli::build_engine(&cli, &config)?;
    let trace = engine.trace();
    info!(
        points = trace.len(),
        blocks = trace.summary().blocks,
        length_mm = trace.total_length(),
        "Program loaded"
    );

    let mut stdout = std::io::stdout();
    cli::run(&mut engine, &mut stdout).await?;
    Ok(())
}
