use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    println!("Feel free to type in commands");
    monkey_interpreter::repl::start()
}
