use crate::prelude::*;

pub mod prelude {
    pub use super::args::prelude::*;
}

pub mod args;
pub mod evaluation;

fn main() {
    let args = match <Args as clap::Parser>::try_parse() {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind::*;

            let exit_code = match err.kind() {
                DisplayHelp |
                DisplayHelpOnMissingArgumentOrSubcommand |
                DisplayVersion => 0,
                _ => 2,
            };

            err.print().unwrap();
            std::process::exit(exit_code);
        },
    };

    if !RECOGNISED_EXTRAS.contains(&args.extra.as_str()) {
        eprintln!("Unrecognised extra mode: '{}' (recognised: {})",
                  args.extra,
                  RECOGNISED_EXTRAS.map(|extra| format!("'{extra}'")).join(", "));
        std::process::exit(2);
    }

    match evaluation::run(args) {
        Ok(()) => {},
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        },
    }
}
