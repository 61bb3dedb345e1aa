use mtls_probe::protocol::https;
use mtls_probe::*;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let args = shell::Args::parse_normalized();

    if args.help {
        println!("{}", shell::USAGE);
        return ExitCode::SUCCESS;
    }

    shell::init_tracing(&args.log_level);

    match try_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ProbeError>() {
                Some(ProbeError::MissingFields(_)) => error!("{}\n{}", e, shell::USAGE),
                _ => error!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: shell::Args) -> anyhow::Result<()> {
    let config = args.into_config()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let response = runtime.block_on(https::run(&config))?;

    response.write_report(&mut std::io::stdout().lock())?;
    Ok(())
}
