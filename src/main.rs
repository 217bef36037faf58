use anyhow::Context;
use tweetlens_lib::{init_logging, run, CliOptions, RunOutcome, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let options = CliOptions::parse(&args);
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    init_logging();

    match run(&options).await {
        Ok(RunOutcome::Analyzed(response)) => {
            let json = serde_json::to_string_pretty(&response).context("serialize response")?;
            println!("{}", json);
            Ok(())
        }
        Ok(RunOutcome::ConfigWritten(path)) => {
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
        Err(err) => {
            let json = serde_json::to_string_pretty(&err.to_response()).context("serialize error")?;
            eprintln!("{}", json);
            let code = if err.status_code() == 404 { 2 } else { 1 };
            std::process::exit(code);
        }
    }
}
