use clap::Parser;
use vehicle_data_processor::cli::{run, Cli};
use vehicle_data_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
