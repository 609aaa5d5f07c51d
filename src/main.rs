use clap::{Arg, Command};
use genie::app::GenieApp;
use genie::ui;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        ui::error("💥 Oops! Something went wrong:");
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // clap only collects raw tokens; flag semantics live in genie::args
    let matches = Command::new("genie")
        .about("Your magical command-line assistant")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("args")
                .num_args(0..)
                .allow_hyphen_values(true)
                .trailing_var_arg(true),
        )
        .get_matches();

    let tokens: Vec<String> = matches
        .get_many::<String>("args")
        .unwrap_or_default()
        .cloned()
        .collect();

    let mut app = GenieApp::initialize()?;

    if console::user_attended() {
        ui::print_banner();
        ui::print_random_tip();
    }

    app.run(&tokens).await?;
    Ok(())
}
