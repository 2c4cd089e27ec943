mod cards;
mod cli;
mod clip;
mod commands;
mod common;
mod compile;
mod config;
mod dates;
mod deps;
mod ffmpeg;
mod manifest;
mod scan;
mod ui;

#[cfg(test)]
mod testing;

use clap::Parser;

use crate::cli::Cli;
use crate::ui::prelude::{Level, OutputFormat, emit};

fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    ui::init(format, !cli.no_color);

    if let Err(err) = commands::handle_command(cli.command) {
        emit(
            Level::Error,
            "error",
            &format!(
                "Encountered error when attempting video compilation:\n{:#}",
                err
            ),
            None,
        );
        std::process::exit(1);
    }
}
