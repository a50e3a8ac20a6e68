use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use socksbridge::common::{
    cli::{parse_command, Commands},
    logger::initialize_logger,
    tasks::start_cancel_listener,
};
use socksbridge::configuration::parse_configuration;
use socksbridge::forward::start_forwards;
use socksbridge::probe::{run_probe, ProbeReport};
use socksbridge::tunnel::TunnelRequest;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let (config_path, command) = parse_command();

    initialize_logger(&command);

    if let Err(e) = run_command(&config_path, command).await {
        debug!("Error running command: {:?}", e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

async fn run_command(config_path: &Path, command: Commands) -> Result<(), std::io::Error> {
    let configuration = parse_configuration(config_path)?;

    match command {
        Commands::Check => {
            println!(
                "Configuration is valid. Proxy: {}",
                configuration.proxy_target()
            );

            for forward in configuration.forwards.iter() {
                println!(
                    "{}:{} -> {} (routing id '{}')",
                    forward.bind_address(),
                    forward.bind_port,
                    forward.tunnel_request(),
                    forward.routing_id
                );
            }
        }
        Commands::Probe {
            routing_id,
            host,
            port,
            timeout,
            ..
        } => {
            let report = run_probe(
                &configuration,
                &routing_id,
                &TunnelRequest::new(host, port),
                configuration.connect_timeout_or(timeout),
            )
            .await;

            println!("{}", report);

            if let ProbeReport::Failed(reason) = report {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, reason));
            }
        }
        Commands::Forward { .. } => {
            info!("Starting forwards...");

            let cancel_token = CancellationToken::new();

            let cancel_future = {
                let cancel_token = cancel_token.clone();
                tokio::spawn(async move { start_cancel_listener(cancel_token).await })
            };

            let result = start_forwards(Arc::new(configuration), cancel_token.clone()).await;

            cancel_token.cancel();
            let _ = cancel_future.await;

            result?;

            println!("Forwards stopped.");
        }
    }

    Ok(())
}
