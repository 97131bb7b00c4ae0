use clap::{Parser, Subcommand};
use arrow_permanova::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "arrow-permanova")]
#[command(about = "Permutational multivariate analysis of variance on distance matrices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run PERMANOVA and print the result as JSON
    Run {
        #[arg(short, long)]
        distance_matrix: PathBuf,
        #[arg(short, long)]
        grouping: PathBuf,
        /// Column of the grouping file holding the group labels
        #[arg(short, long)]
        column: String,
        #[arg(short, long, default_value_t = DEFAULT_PERMUTATIONS, allow_negative_numbers = true)]
        permutations: i64,
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long)]
        threads: Option<usize>,
        #[arg(long)]
        serial: bool,
        #[arg(long, default_value_t = '\t')]
        delimiter: char,
    },
    /// Print the sum-of-squares decomposition for a grouping
    Partition {
        #[arg(short, long)]
        distance_matrix: PathBuf,
        #[arg(short, long)]
        grouping: PathBuf,
        #[arg(short, long)]
        column: String,
        #[arg(long, default_value_t = '\t')]
        delimiter: char,
    },
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter).map_err(|_| {
        PermanovaError::invalid_parameter(format!("delimiter must be a single byte, got '{}'", delimiter))
    })
}

fn load(
    distance_matrix: &Path,
    grouping: &Path,
    column: &str,
    delimiter: u8,
) -> Result<(SymmetricDistanceMatrix, Vec<String>)> {
    let dm = read_distance_matrix(distance_matrix, delimiter)?;
    let mapping = read_grouping(grouping, column, delimiter)?;
    let labels = grouping_for(&dm, &mapping)?;
    Ok((dm, labels))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            distance_matrix,
            grouping,
            column,
            permutations,
            seed,
            threads,
            serial,
            delimiter,
        } => {
            let (dm, labels) = load(&distance_matrix, &grouping, &column, delimiter_byte(delimiter)?)?;

            let mut config = PermutationConfig {
                seed,
                parallel: !serial,
                ..PermutationConfig::default()
            };
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }

            let result = Permanova::with_config(&dm, labels, config)?.run(permutations)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Partition {
            distance_matrix,
            grouping,
            column,
            delimiter,
        } => {
            let (dm, labels) = load(&distance_matrix, &grouping, &column, delimiter_byte(delimiter)?)?;

            let test = Permanova::new(&dm, labels)?;
            println!("{}", serde_json::to_string_pretty(&test.sum_of_squares())?);
        }
    }

    Ok(())
}
