#![forbid(unsafe_code)]

//! ticlif Demo Showcase binary entry point.

use std::env;
use std::fs::File;
use std::sync::Mutex;

use ticlif_demo_showcase::app::Demo;
use ticlif_demo_showcase::cli;
use ticlif_runtime::{Controller, Program, ProgramConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log to the file named by `TICLIF_LOG`. The terminal belongs to the UI, so
/// nothing is logged when it is unset.
fn init_logging() {
    let Ok(path) = env::var("TICLIF_LOG") else {
        return;
    };
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {path}: {e}");
            return;
        }
    };
    let filter =
        EnvFilter::try_from_env("TICLIF_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() {
    let opts = cli::Opts::parse();
    init_logging();

    let config = ProgramConfig::from_env()
        .with_poll_timeout(opts.poll_timeout())
        .with_alternate_screen(opts.alt_screen);

    let mut controller = Controller::new();
    let demo = match Demo::mount(&mut controller) {
        Ok(demo) => demo,
        Err(e) => {
            eprintln!("Failed to build the demo: {e}");
            std::process::exit(1);
        }
    };
    let start = demo.start_root(opts.start_root);

    let counter = demo.counter.clone();
    let fruits = demo.fruits.clone();
    let name = demo.name.clone();
    let result = Program::with_terminal(controller, config).map(|program| {
        program.with_exit_hook(move |controller| {
            info!(
                frames = controller.state().frame(),
                clicks = counter.get(),
                fruit = fruits.borrow().len(),
                name = %name.borrow(),
                "demo finished"
            );
        })
    });

    match result {
        Ok(mut program) => {
            if let Err(e) = program.run_with_root(start) {
                drop(program);
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}
