mod app;
mod config;
mod export;
mod formatting;
mod links;
mod matcher;
mod queries;
mod session;
mod tabular;
mod ui;

use std::env;

fn main() {
    if env::args().len() > 1 {
        eprintln!(
            "LinkDesk es interactivo y no acepta argumentos. Ejecuta solo `cargo run` o el binario sin parámetros."
        );
        std::process::exit(1);
    }

    if let Err(message) = app::run() {
        eprintln!("{message}");
        std::process::exit(1);
    }
}
