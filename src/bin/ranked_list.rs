use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    rerank_data::logging::init_logging("info")?;
    rerank_data::cli::run_ranked_list(std::env::args().skip(1))
}
