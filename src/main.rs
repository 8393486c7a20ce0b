use anyhow::Result;
use console::{Term, style};
use dialoguer::Confirm;
use log::{info, warn};
use sharp_frame_select::component::SelectionPipeline;
use sharp_frame_select::config::Config;
use sharp_frame_select::init;
use sharp_frame_select::signal::setup_shutdown_signal;

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    let mut config = Config::new()?;

    loop {
        let pipeline = SelectionPipeline::new(&shutdown_signal);

        if let Err(e) = pipeline.run(&mut config) {
            warn!("處理失敗: {e:#}");
            eprintln!("{} {e:#}", style("錯誤:").red().bold());
        }

        if shutdown_signal.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }

        let again = Confirm::new()
            .with_prompt("要處理另一個輸入嗎？")
            .default(false)
            .interact()?;

        if !again {
            break;
        }
        term.clear_screen()?;
    }

    println!("\n{}", style("再見！").green().bold());
    info!("程式正常結束");

    Ok(())
}
