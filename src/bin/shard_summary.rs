use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    rerank_data::logging::init_logging("info")?;
    rerank_data::cli::run_shard_summary(std::env::args().skip(1))
}
