use clap::Parser;

/// This is an instant-runoff tabulation program, with approval-based tie breaking.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON format.
    /// For more information about the file format, read the manual of the ranked_tally library.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, rcvtally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. By default, the summary is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The ballots, as a JSON list of records. Setting this option overrides the ballot file
    /// that may be specified with the --config option. Without --config, the options are read from the ballots.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (eliminate_all or approval) Overrides the tie breaking mode of the configuration.
    #[clap(long, value_parser)]
    pub tie_breaking: Option<String>,

    /// (positive number) Overrides the maximum number of rounds of the configuration.
    #[clap(long, value_parser)]
    pub max_rounds: Option<u32>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
