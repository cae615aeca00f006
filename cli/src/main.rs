use clap::Parser;
use roux_cli::{Cli, Commands, repl};
use roux_driver::{Conf, Session, check_source};
use roux_dynamics::syntax::{Sourceify, Value};

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let level = if cli.command.verbose() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        | Commands::Run { file, dry: false, print, .. } => {
            let session = Session::stdout(Conf::load()).map_err(|e| e.render())?;
            session
                .run_file_with(&file, |v, _| {
                    if print && !matches!(v, Value::Unspecified) {
                        println!("{}", v.sourceify());
                    }
                })
                .map_err(|e| e.render())?;
        }
        | Commands::Run { file, dry: true, .. } | Commands::Check { file, .. } => {
            let text = std::fs::read_to_string(&file).map_err(|e| e.to_string())?;
            let forms = check_source(Some(file.clone()), &text).map_err(|e| e.render())?;
            log::info!("{}: {} forms", file.display(), forms.len());
        }
        | Commands::Repl { .. } => repl::launch()?,
    }
    Ok(())
}
