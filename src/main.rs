use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cares",
    version,
    about = "cares - Write and browse a cares blog from the terminal."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Blog base URL (overrides server.base_url)
    #[arg(long)]
    server: Option<String>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Use a throwaway in-memory blog instead of a server
    #[arg(long)]
    demo: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save the credentials used to publish posts
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Login { username, password }) => {
            cares::app::login(cli.config, &username, &password).map(|path| {
                println!("Saved credentials for {} to {}", username.trim(), path);
            })
        }
        None => cares::run(cares::app::RunOptions {
            config_file: cli.config,
            server: cli.server,
            log_level: cli.log_level,
            demo: cli.demo,
        }),
    };

    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
