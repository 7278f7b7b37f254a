//! OrgBoard command-line entry point.

mod cli;

fn main() {
    env_logger::init();
    log::info!("Starting OrgBoard");

    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
