use anyhow::Context;
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use ziwei_reader::core::ImageSource;
use ziwei_reader::ui::{LoadingIndicator, Renderer};
use ziwei_reader::utils::error::ErrorSeverity;
use ziwei_reader::utils::{logger, validation::Validate};
use ziwei_reader::{
    AppStatus, ChartReader, CliConfig, GeminiAnalyzer, LocalStorage, ReaderConfig, ReaderError,
    TomlConfig,
};

type InputLines = Lines<BufReader<Stdin>>;

fn exit_code(e: &ReaderError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &ReaderError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建议: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

async fn prompt(lines: &mut InputLines, label: &str) -> anyhow::Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines
        .next_line()
        .await?
        .map(|line| line.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string()))
}

async fn dry_run(
    analyzer: &GeminiAnalyzer<ReaderConfig>,
    storage: &LocalStorage,
    image: Option<&str>,
) -> anyhow::Result<()> {
    let path = image.context("--dry-run needs an image path")?;
    let payload = storage.load_image(path).await?;

    let mut request = analyzer.describe_request(&payload);
    if let Some(data) = request.pointer_mut("/contents/0/parts/0/inlineData/data") {
        *data = serde_json::json!(format!("<{} bytes, base64>", payload.byte_len));
    }

    tracing::info!("🔍 DRY RUN MODE - no request will be sent");
    println!("POST {}", analyzer.endpoint());
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting ziwei-reader");

    let toml = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path).unwrap_or_else(|e| fail(&e))
        }
        None => TomlConfig::default(),
    };

    let config = ReaderConfig::from_cli(&cli, &toml, |name| std::env::var(name).ok());
    if let Err(e) = config.validate() {
        fail(&e);
    }
    tracing::debug!(
        "Resolved config: api_base={}, model={}, output_path={}, timeout={}s",
        config.api_base,
        config.model,
        config.output_path,
        config.timeout_seconds
    );

    let renderer = Renderer::new(config.wrap_width);
    let storage = LocalStorage::new(config.output_path.clone());
    let analyzer = GeminiAnalyzer::new(config.clone()).unwrap_or_else(|e| fail(&e));

    if cli.dry_run {
        return dry_run(&analyzer, &storage, cli.image.as_deref()).await;
    }

    if config.api_key.is_none() {
        tracing::warn!("No API key configured; analysis requests will fail");
    }

    let mut reader = ChartReader::new(analyzer, storage);
    let loading = LoadingIndicator::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = cli.image.clone();

    print!("{}", renderer.render(reader.state(), 0));

    loop {
        match reader.state().status {
            AppStatus::Idle | AppStatus::Error => {
                let path = match pending.take() {
                    Some(path) => path,
                    None => match prompt(&mut lines, "命盘截图路径（q 退出）> ").await? {
                        None => break,
                        Some(input) if input.eq_ignore_ascii_case("q") => break,
                        Some(input) if input.is_empty() => continue,
                        Some(input) => input,
                    },
                };

                let outcome = loading
                    .animate_while(reader.select_file(&path), |frame| {
                        print!("\r{}", renderer.loading_line(frame));
                        let _ = std::io::stdout().flush();
                    })
                    .await
                    .map(|state| state.status);
                println!();

                if let Err(e) = outcome {
                    eprintln!("❌ {}", e.user_friendly_message());
                    continue;
                }
                print!("{}", renderer.render(reader.state(), 0));

                if cli.save_report {
                    match reader.state().status {
                        AppStatus::Result => {
                            let path = reader.download_report().await.unwrap_or_else(|e| fail(&e));
                            println!("📁 报告已保存：{}", path);
                        }
                        _ => std::process::exit(2),
                    }
                    break;
                }
            }
            AppStatus::Result => {
                let choice = match prompt(&mut lines, "选择操作 D/R/Q > ").await? {
                    None => break,
                    Some(choice) => choice.to_lowercase(),
                };
                match choice.as_str() {
                    "d" => match reader.download_report().await {
                        Ok(path) => println!("📁 报告已保存：{}", path),
                        Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
                    },
                    "r" => {
                        reader.reset().context("reset failed")?;
                        print!("{}", renderer.render(reader.state(), 0));
                    }
                    "q" => break,
                    _ => continue,
                }
            }
            AppStatus::Analyzing => {
                // select_file 回傳時分析必定已結束
                tracing::warn!("Unexpected in-flight analysis at prompt");
                break;
            }
        }
    }

    tracing::info!("ziwei-reader finished");
    Ok(())
}
