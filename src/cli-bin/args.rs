pub mod prelude {
    pub use super::{
        Args,
        RECOGNISED_EXTRAS,
    };
}

const DEFAULT_AFTER_HELP: &str = "Refer to the crate's documentation for further help";

/// The extra evaluation modes the auction sweep understands.
pub const RECOGNISED_EXTRAS: [&str; 4] = ["", "full optimal", "fixed optimal", "time limited"];

#[derive(clap::Parser, Debug)]
#[command(after_help=DEFAULT_AFTER_HELP)]
pub struct Args {
    /// Model distribution file
    #[arg(short='f', long="file", value_name="MODEL FILE")]
    pub file: String,

    /// Number of tasks to sample per repeat
    #[arg(short='t', long="tasks", value_name="# TASKS", default_value="10")]
    pub tasks: usize,

    /// Number of servers to sample per repeat
    #[arg(short='s', long="servers", value_name="# SERVERS", default_value="3")]
    pub servers: usize,

    /// Number of sampled populations to evaluate
    #[arg(short='r', long="repeat", value_name="# REPEATS", default_value="1")]
    pub repeat: usize,

    /// Extra evaluation mode
    ///
    /// 'full optimal' runs everything (the default), 'fixed optimal' skips
    /// the flexible VCG auction, 'time limited' skips both VCG auctions.
    #[arg(short='e', long="extra", value_name="MODE", default_value="")]
    pub extra: String,

    /// Seed for the shared random source
    #[arg(long="seed", value_name="SEED", default_value="0")]
    pub seed: u64,

    /// Wall-clock limit per solver invocation, in seconds
    #[arg(long="time-limit", value_name="SECONDS", default_value="5")]
    pub time_limit: u64,

    /// Results file; written to stdout when omitted
    #[arg(short='o', long="output", value_name="RESULTS FILE")]
    pub output: Option<String>,
}
