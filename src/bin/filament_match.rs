use std::error::Error;

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so stdout can carry only the JSON leads.
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filament::app::log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    filament::app::run_find_leads(std::env::args().skip(1))
}
