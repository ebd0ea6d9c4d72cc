// ログ初期化
// tracing-subscriberのfmtレイヤーをEnvFilter付きで設定する

use tracing_subscriber::EnvFilter;

/// `-v`の回数からデフォルトのフィルタ指定を決める
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "snap_caption=info",
        2 => "snap_caption=debug",
        _ => "trace",
    }
}

/// グローバルなtracingサブスクライバを初期化
///
/// `RUST_LOG`が設定されていればそちらを優先する。二回目以降の呼び出しは無視される。
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // ログはstderrへ（stdoutはJSON出力に使う）
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
