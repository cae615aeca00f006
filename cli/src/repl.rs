use colored::Colorize;
use roux_driver::{Conf, DriverError, Session};
use roux_dynamics::syntax::{Pretty, Value, render};
use roux_surface::ParseError;
use std::io::{BufRead, Write};

const WIDTH: usize = 80;

fn incomplete(err: &DriverError) -> bool {
    matches!(err, DriverError::ParseError { error: ParseError::UnexpectedEof { .. }, .. })
}

pub fn launch() -> Result<(), String> {
    println!("Roux v{}", env!("CARGO_PKG_VERSION"));
    let session = Session::stdout(Conf::load()).map_err(|e| e.render())?;
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();
    loop {
        {
            let prompt = if buffer.is_empty() { "> " } else { ". " };
            print!("{}", prompt);
            std::io::stdout().flush().map_err(|e| e.to_string())?;
        }
        let Some(line) = lines.next() else { break };
        buffer.push_str(&line.map_err(|e| e.to_string())?);
        buffer.push('\n');
        let mut shown: Vec<Value> = Vec::new();
        match session.run_source(None, &buffer, |v, _| shown.push(v.clone())) {
            | Err(err) if incomplete(&err) => continue,
            | Err(err) => {
                for v in &shown {
                    print_value(v);
                }
                println!("{}", err.render().red());
            }
            | Ok(_) => {
                for v in &shown {
                    print_value(v);
                }
            }
        }
        buffer.clear();
    }
    println!();
    Ok(())
}

fn print_value(v: &Value) {
    if !matches!(v, Value::Unspecified) {
        println!("{}", render(v.pretty(), WIDTH).green());
    }
}
