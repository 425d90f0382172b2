use clap::Parser;
use jpq::{Args, CliError, read_document, run};

fn main() -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("jpq=warn")).init();

    let args = Args::parse();
    let document = read_document(&args)?;
    for line in run(&args, &document)? {
        println!("{line}");
    }
    Ok(())
}
