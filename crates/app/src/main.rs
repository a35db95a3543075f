use std::process;

mod headless;
mod logging;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let parsed = match headless::parse_headless_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("heatlayer: {err}");
            process::exit(2);
        }
    };

    logging::setup_tracing(parsed.log_level);
    tracing::info!("Heatlayer starting");

    match headless::run_headless(&parsed) {
        Ok(summary) => {
            if parsed.print {
                if let Err(err) = headless::print_summary(&summary) {
                    eprintln!("heatlayer: {err}");
                    process::exit(1);
                }
            }
        }
        Err(err) => {
            tracing::error!("heatlayer: {err}");
            eprintln!("heatlayer: {err}");
            process::exit(1);
        }
    }
}
