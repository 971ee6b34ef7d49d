use clap::Parser;
use game_asset_gen::utils::{logger, validation::Validate};
use game_asset_gen::{
    AssetError, BatchAssetGenerator, CatalogFile, CliConfig, GenerationParams, GeneratorConfig,
    HttpImageService, JobCatalog, LocalStorage, OutputLayout, watch_interrupts,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_json);

    tracing::info!("🎮 Starting game asset generation");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let (catalog, catalog_file, params) = match load_catalog(&config) {
        Ok(loaded) => loaded,
        Err(e) => fail(&e),
    };

    let generator_config = GeneratorConfig::from_provider(&config, params);
    let layout = match &catalog_file {
        Some(file) => file.to_layout(&generator_config.output_dir),
        None => generator_config.standard_layout(),
    };

    if let Err(e) = layout.ensure_covers(&catalog) {
        fail(&e);
    }

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&generator_config, &catalog, &layout);
        return Ok(());
    }

    if let Err(e) = generator_config.validate() {
        fail(&e);
    }

    let service = match HttpImageService::from_config(&generator_config) {
        Ok(service) => service,
        Err(e) => fail(&e),
    };
    let generator = BatchAssetGenerator::new(service, LocalStorage::new(), &generator_config);

    // 第一次 Ctrl-C 在素材之間停止，進行中的請求會跑完或逾時；第二次直接結束
    let stop = generator.stop_handle();
    tokio::spawn(async move {
        if watch_interrupts(stop, tokio::signal::ctrl_c).await {
            std::process::exit(130);
        }
    });

    let tally = match generator.execute(&catalog, &layout).await {
        Ok(tally) => tally,
        Err(e) => fail(&e),
    };

    println!();
    println!("🎯 Generation complete! Succeeded: {}/{}", tally.succeeded, catalog.len());

    println!("📂 Asset folders:");
    for (category, files) in generator.layout_summary(&layout).await {
        println!("   {}/", category);
        for file in files {
            if let Some(name) = file.file_name() {
                println!("   ├── {}", name.to_string_lossy());
            }
        }
    }

    if tally.attempted < catalog.len() {
        tracing::warn!(
            "Run interrupted: {} of {} assets were not attempted",
            catalog.len() - tally.attempted,
            catalog.len()
        );
    }

    if tally.attempted < catalog.len() || !tally.all_succeeded() {
        tracing::error!("❌ {} assets failed", catalog.len() - tally.succeeded);
        std::process::exit(1);
    }

    tracing::info!("✅ All assets generated");
    Ok(())
}

fn load_catalog(
    config: &CliConfig,
) -> game_asset_gen::Result<(JobCatalog, Option<CatalogFile>, GenerationParams)> {
    let (mut catalog, catalog_file, params) = match &config.catalog {
        Some(path) => {
            tracing::info!("📁 Loading catalog from: {}", path.display());
            let file = CatalogFile::from_file(path)?;
            file.validate()?;
            let params = file.generation_params();
            (file.to_catalog(), Some(file), params)
        }
        None => {
            tracing::info!("📋 Using built-in catalog: {:?}", config.preset);
            (config.preset.build(), None, GenerationParams::default())
        }
    };

    if !config.only.is_empty() {
        catalog.retain_categories(&config.only);
    }

    if catalog.is_empty() {
        return Err(AssetError::config("No assets to generate"));
    }

    Ok((catalog, catalog_file, params))
}

fn perform_dry_run(config: &GeneratorConfig, catalog: &JobCatalog, layout: &OutputLayout) {
    let params = &config.params;
    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📡 Generation Service:");
    println!("  Endpoint: {}/v1/images/generations", config.base_url.trim_end_matches('/'));
    println!(
        "  Model: {}, Size: {}, Style: {}, Quality: {}",
        params.model, params.size, params.style, params.quality
    );
    println!("  Delay between jobs: {:?}", config.delay);
    println!(
        "  Timeouts: request {:?}, download {:?}",
        config.request_timeout, config.download_timeout
    );
    println!("  Output root: {}", config.output_dir.display());

    println!();
    println!("💾 Planned Assets ({}):", catalog.len());
    let total = catalog.len();
    for (i, job) in catalog.jobs().enumerate() {
        let target = layout
            .target_path(job)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|e| e.to_string());
        println!("  [{}/{}] {} -> {}", i + 1, total, job.name, target);
        println!("        {}", job.prompt_preview());
    }

    println!();
    println!("✅ Dry run analysis complete.");
}

fn fail(e: &AssetError) -> ! {
    tracing::error!(
        "❌ Asset generation aborted: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
