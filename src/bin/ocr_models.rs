use transport_ocr_ops::config::cli;
use transport_ocr_ops::utils::logger;
use transport_ocr_ops::{ModelProvisioner, ModelsArgs, OpsConfig, SystemRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ModelsArgs = cli::parse_or_exit();

    logger::init_logger(args.verbose);

    let config = match OpsConfig::load_validated(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let provisioner = ModelProvisioner::new(config.models.clone(), config.root(), SystemRunner::new());

    match provisioner.run().await {
        Ok(report) => {
            println!("✅ Models ready: {}", report.layoutlm_dir.display());
        }
        Err(e) => {
            tracing::error!("❌ Model download failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}
