use env_logger::Env;

/// 初始化日誌系統
///
/// 預設等級為 info，可透過 RUST_LOG 環境變數覆寫
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}
