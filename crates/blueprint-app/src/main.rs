//! Command-line entry point.

use blueprint_app::{App, AppConfig, Command};

fn main() {
    env_logger::init();
    log::info!("Starting BlueprintBoard");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = Command::parse(&args).and_then(|command| {
        let mut app = App::with_config(AppConfig::default());
        let outcome = app.run(command);
        app.shutdown();
        outcome
    });

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
