//! Studio command line driver.
//!
//! Runs one image generation against the configured endpoint, inserts the
//! result as a layer and prints the document's layers as JSON.
//!
//! ```text
//! studio-cli <prompt> [mode] [context]
//! ```
//!
//! `STUDIO_CONFIG` may point at a JSON config file; unset fields keep their
//! defaults. Logging follows `RUST_LOG`.

use studio_editor::{HttpGenerationClient, Studio, StudioConfig};

const USAGE: &str = "usage: studio-cli <prompt> [mode] [context]";

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("studio-cli error: {message}");
    std::process::exit(1);
}

fn load_config() -> StudioConfig {
    let Some(path) = std::env::var_os("STUDIO_CONFIG") else {
        return StudioConfig::default();
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => fail(format_args!("cannot read {}: {e}", path.to_string_lossy())),
    };
    match StudioConfig::from_json(&text) {
        Ok(config) => config,
        Err(e) => fail(format_args!("invalid config {}: {e}", path.to_string_lossy())),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(prompt) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    if prompt == "--help" || prompt == "-h" {
        println!("{USAGE}");
        return;
    }

    let config = load_config();
    let client = match HttpGenerationClient::new(&config.generation) {
        Ok(client) => client,
        Err(e) => fail(e),
    };
    log::info!("generating via {}", client.endpoint());

    let mut studio = Studio::new(config);
    let state = studio.generation_mut();
    state.prompt = prompt.clone();
    state.creative_mode = Some(args.get(1).cloned().unwrap_or_else(|| "General".into()));
    state.context = Some(args.get(2).cloned().unwrap_or_else(|| "General".into()));

    if studio.generate_image(&client).await.is_none() {
        let message = studio
            .generation()
            .error
            .clone()
            .unwrap_or_else(|| "image generation failed".into());
        fail(message);
    }

    match serde_json::to_string_pretty(studio.layers()) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}
