use std::path::Path;
use the_layercake::config::{load_config, JobRegistry};

/// Demo: find every 3-cycle in a graph stored under demos/data/graph,
/// driven by demos/configs/directed_graph.yaml.
async fn run_directed_graph_demo() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Layercake Directed Graph Demo ===\n");

    let base_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let config = load_config(base_dir.join("configs").join("directed_graph.yaml"))?;
    println!("Layers: {:?}", config.layers.iter().map(|l| l.job.as_str()).collect::<Vec<_>>());

    let registry = JobRegistry::with_builtin_jobs();
    let pipeline = config.build(&registry, &base_dir)?;
    println!("Pipeline shape: {:?}\n", pipeline.summary().layers);

    let count = pipeline.start().await?;
    println!("\n{} cycles found", count);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run_directed_graph_demo().await {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
