use std::time::Duration;
use transport_ocr_ops::config::cli;
use transport_ocr_ops::utils::logger;
use transport_ocr_ops::{HealthArgs, HealthVerifier, OpsConfig, ReqwestProber, SystemRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: HealthArgs = cli::parse_or_exit();

    logger::init_logger(args.verbose);

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
    let verifier = HealthVerifier::new(
        config.topology(),
        &config.project.engine,
        &config.bucket.cli,
        SystemRunner::new(),
        prober,
    )
    .with_status_on_stderr(args.json);

    let report = verifier.run().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    std::process::exit(report.exit_code());
}
