use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 設定 Ctrl-C 中斷信號
///
/// 第一次中斷只設定旗標，讓進行中的工作收尾；
/// 第二次中斷直接結束程式。
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        if signal_clone.swap(true, Ordering::SeqCst) {
            eprintln!("\n再次收到中斷信號，強制結束");
            std::process::exit(130);
        }
        eprintln!("\n收到中斷信號，正在安全停止...");
    })
    .expect("無法設定 Ctrl-C 處理器");

    shutdown_signal
}
