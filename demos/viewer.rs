//! Windowed viewer demo.
//!
//! ```sh
//! cargo run --example viewer -- Soldier.glb
//! cargo run --example viewer -- models/RobotExpressive.glb assets
//! ```
//!
//! With no arguments, loads the default asset through the standard
//! `fbx/<name>.fbx` layout under `assets/`.

use std::path::PathBuf;

use marionette::viewer::ViewerOptions;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let initial_asset = args.next();
    let asset_root = args.next().map_or_else(|| PathBuf::from("assets"), PathBuf::from);

    if let Some(name) = &initial_asset {
        println!("Loading model: {name}");
    }

    marionette::app::run(ViewerOptions {
        initial_asset,
        asset_root,
        ..ViewerOptions::default()
    })?;

    Ok(())
}
