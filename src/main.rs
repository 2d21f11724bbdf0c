mod config;
mod data_aquisition;
mod gui;
mod logging;
mod network;
mod parsers;
mod topology;

use std::sync::Arc;

use config::MeshStatusConfig;
use gui::app;
use tracing::{error, warn};

fn main() {
    logging::init_tracing();

    let (config, errors) = MeshStatusConfig::from_env();
    for e in errors {
        warn!(error = %e, "ignoring configuration override");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(e) => {
            error!(error = %e, "could not start the tokio runtime");
            std::process::exit(1);
        }
    };
    app::main(rt, config);
}
