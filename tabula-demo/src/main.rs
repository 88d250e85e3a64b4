//! Drives a grid and a pagination bar over a store and prints each frame.
//!
//! Usage: `tabula-demo [config.json]`. Without a file a built-in people
//! table is used.

mod config;
mod error;
mod print;

use std::fs::File;
use std::time::{Duration, Instant};

use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};
use tabula::prelude::*;

use crate::config::DemoConfig;
use crate::error::DemoError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DemoError> {
    let log_file = File::create("tabula-demo.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let mut config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::from_file(path)?,
        None => DemoConfig::sample()?,
    };
    info!("Starting demo {}x{}", config.width, config.height);

    let store = config.build_store();
    let grid = Grid::from_config(store.clone(), config.grid.clone());
    grid.set_size(config.width, config.height);
    let pagination = Pagination::new(store.clone());

    grid.on(|event| match event {
        GridEvent::SelectionChange(records) => {
            info!("Selection changed: {} record(s)", records.len());
        }
        GridEvent::OpenItem { index, .. } => info!("Opened row {}", index),
        GridEvent::OpenMenu { menu, .. } => {
            menu.add(MenuItem::new("copy", "Copy"), None);
        }
        _ => {}
    });

    if !store.load().await {
        return Err(DemoError::Load(store.last_message().unwrap_or_default()));
    }
    frame("loaded", &grid, &pagination);

    if let Some(field) = &config.sort
        && let Some(leaf) = grid
            .columns()
            .iter()
            .position(|c| c.data_index.as_deref() == Some(field.as_str()))
    {
        grid.toggle_sort(leaf).await;
        frame(&format!("sorted by {}", field), &grid, &pagination);
    }

    grid.handle_key(&Key::Down.into());
    grid.handle_key(&Key::Down.into());
    grid.handle_key(&Key::Space.into());
    frame("keyboard selection", &grid, &pagination);

    grid.start_frames();
    grid.on_wheel(&WheelEvent::lines(0.0, 1.0), Instant::now());
    tokio::time::sleep(Duration::from_millis(500)).await;
    frame("after wheel", &grid, &pagination);

    if pagination.next().await {
        frame("next page", &grid, &pagination);
    }

    grid.dispose();
    info!("Demo finished");
    Ok(())
}

fn frame(title: &str, grid: &Grid, pagination: &Pagination) {
    println!("== {} ==", title);
    print!("{}", print::grid(&grid.render()));
    print!("{}", print::pagination(&pagination.render()));
    println!();
}
