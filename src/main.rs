use std::time::Duration;
use transport_ocr_ops::config::cli;
use transport_ocr_ops::utils::logger;
use transport_ocr_ops::{DeployArgs, Deployer, OpsConfig, ReqwestProber, SystemRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Unknown flags and --help exit here, before anything touches the host.
    let args: DeployArgs = cli::parse_or_exit();

    logger::init_logger(args.verbose);
    tracing::debug!("CLI args: {:?}", args);

    let config = match OpsConfig::load_validated(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let prober = ReqwestProber::new(Duration::from_secs(config.http.timeout_seconds))?;
    let runner = SystemRunner::new();
    let deployer = Deployer::new(config, runner, prober);

    match deployer.run(&args.run_options()).await {
        Ok(report) => {
            tracing::info!(
                ready = report.all_ready(),
                created_dirs = report.created_directories.len(),
                "Deployment finished"
            );
        }
        Err(e) => {
            tracing::error!("❌ Deployment failed: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}
