use price_sheet::Config;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    log::debug!("Running with {config:?}");
    let items = price_sheet::run(&config);
    log::info!("Extracted {} items", items.len());
}
