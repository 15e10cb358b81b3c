use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 互動畫面與日誌共用同一個終端機，預設只留警告；`--verbose` 才看得到狀態轉換
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "ziwei_reader=debug,info"
    } else {
        "ziwei_reader=warn"
    }
}

/// `RUST_LOG` 有設定時優先
pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
