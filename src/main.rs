use clap::Parser;

use ballpit::config::Args;

fn main() {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();
    let config = args.to_config();

    if let Err(err) = ballpit::app::run(config, args.paused) {
        log::error!("Event loop failed: {err}");
        std::process::exit(1);
    }
}
