use anyhow::Result;

fn main() -> Result<()> {
    tagnotes::cli::run()
}
