use placement_config::{OperatorConfig, CONFIG_ENV};

fn main() {
    // Read the PLACEMENT_CONFIG env var for a path, or attempt to open $HOME/.placement/config.yaml
    // Print the defaults applied to submitted manifests

    fluvio_future::subscriber::init_tracer(None);
    let config = OperatorConfig::load(None).expect("Load failed");

    match &config.path {
        Some(path) => println!("loaded from {}", path.display()),
        None => println!("{CONFIG_ENV} not set, built-in defaults"),
    }
    println!("{:#?}", config.defaults)
}
