use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use spincube::logging::{LoggingConfig, init_logging};
use spincube::{AppConfig, FRAGMENT_SHADER_PATH, VERTEX_SHADER_PATH, Variant};

/// A letterboxed, keyboard-driven spinning cube.
///
/// Arrow keys rotate. With `--variant indexed`: I/K scale, W cycles
/// fill/line/point, C toggles back-face culling.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Which demo to run
    #[arg(long, value_enum, default_value_t = Variant::Arrays)]
    variant: Variant,

    /// WGSL vertex shader (entry point `vs_main`, uniform `u_MVP`)
    #[arg(long, default_value = VERTEX_SHADER_PATH)]
    vertex_shader: PathBuf,

    /// WGSL fragment shader (entry point `fs_main`)
    #[arg(long, default_value = FRAGMENT_SHADER_PATH)]
    fragment_shader: PathBuf,

    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log_filter.clone(),
        ..Default::default()
    });

    let config = AppConfig::new()
        .variant(cli.variant)
        .shaders(cli.vertex_shader, cli.fragment_shader);

    match spincube::run(config).context("spincube exited with an error") {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(1)
        }
    }
}
