use maze_mdp::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> MazeResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MazeConfig::from_path(path)?,
        None => MazeConfig::default(),
    };

    let report = run(&config)?;
    info!(
        converged = report.convergence.is_converged(),
        sweeps = report.convergence.sweeps(),
        "Done"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
