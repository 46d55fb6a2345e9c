use clap::Parser;
use router_client::cli::{ask, chat, load_config_with_overrides, status, Cli, Commands};
use router_client::logging::init_tracing;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat(args) => {
            let config = load_config_with_overrides(&args.common)?;
            init_tracing(&config.logging)?;
            chat::run_chat(args, config).await
        }
        Commands::Ask(args) => {
            let config = load_config_with_overrides(&args.common)?;
            init_tracing(&config.logging)?;
            let output = ask::handle_ask(&args, &config).await?;
            println!("{}", output);
            Ok(())
        }
        Commands::Health(args) => {
            let config = load_config_with_overrides(&args.common)?;
            init_tracing(&config.logging)?;
            let output = status::handle_health(&args, &config).await?;
            println!("{}", output);
            Ok(())
        }
        Commands::Metrics(args) => {
            let config = load_config_with_overrides(&args.common)?;
            init_tracing(&config.logging)?;
            let output = status::handle_metrics(&args, &config).await?;
            println!("{}", output);
            Ok(())
        }
    }
}
