//! Command-line runners behind the `ranked_list` and `shard_summary` binaries.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::constants::shards::DEFAULT_ID_COLUMN;
use crate::results::aggregate_folder;
use crate::shards::{ParquetShardReader, ShardReader, list_shard_files, sorted_shards, total_rows};

#[derive(Debug, Parser)]
#[command(
    name = "ranked_list",
    disable_help_subcommand = true,
    about = "Merge per-shard inference results into one ranked-list file",
    long_about = "Read every result shard in RESULTS_FOLDER_PATH, sort rows by query id ascending and score descending, and write one `{query_id} Q0 {passage_id} {rank} {score} dense` line per row to OUTPUT_PATH."
)]
struct RankedListCli {
    #[arg(value_name = "RESULTS_FOLDER_PATH", help = "Folder holding result shards")]
    results_folder_path: PathBuf,
    #[arg(value_name = "OUTPUT_PATH", help = "Ranked-list file to write")]
    output_path: PathBuf,
}

#[derive(Debug, Parser)]
#[command(
    name = "shard_summary",
    disable_help_subcommand = true,
    about = "Metadata row totals and first-row-id order for a shard folder",
    long_about = "Sum parquet metadata row counts for every file in FOLDER (no row scan) and list the shards in the order of the id found in their first row."
)]
struct ShardSummaryCli {
    #[arg(value_name = "FOLDER", help = "Folder holding parquet shards")]
    folder: PathBuf,
    #[arg(
        long = "id-column",
        default_value = DEFAULT_ID_COLUMN,
        help = "Column whose first-row value orders the shards"
    )]
    id_column: String,
}

/// Run `ranked_list` with arguments after the program name.
pub fn run_ranked_list<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<RankedListCli, _>(std::iter::once("ranked_list".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let lines = aggregate_folder(&cli.results_folder_path, &cli.output_path)?;
    println!(
        "wrote {} ranked lines to {}",
        lines,
        cli.output_path.display()
    );
    Ok(())
}

/// Run `shard_summary` with arguments after the program name.
pub fn run_shard_summary<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<ShardSummaryCli, _>(
        std::iter::once("shard_summary".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let total = total_rows(&cli.folder)?;
    let files = list_shard_files(&cli.folder)?;
    let ordered = sorted_shards(&files, &cli.id_column)?;

    println!("=== shard summary ===");
    println!("folder: {}", cli.folder.display());
    println!("total rows (metadata): {total}");
    println!("shards ordered by first {}:", cli.id_column);
    for path in &ordered {
        println!(
            "  {} ({} rows)",
            path.display(),
            ParquetShardReader.row_count(path)?
        );
    }
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
