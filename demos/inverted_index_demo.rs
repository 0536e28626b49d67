use the_layercake::builtins::{MemoryInput, MemoryOutput};
use the_layercake::engine::{InputSpec, OutputSpec};
use the_layercake::jobs::inverted_index;
use the_layercake::PipelineBuilder;

/// Demo: which documents mention each word.
async fn run_inverted_index_demo() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Layercake Inverted Index Demo ===\n");

    let documents = vec![
        ("intro.txt", "the quick brown fox"),
        ("sequel.txt", "the lazy dog"),
        ("finale.txt", "quick dog"),
    ];

    // One record per (document, word), keyed by document name
    let records: Vec<(String, String)> = documents
        .iter()
        .flat_map(|(doc, text)| {
            text.split_whitespace()
                .map(move |word| (doc.to_string(), word.to_string()))
        })
        .collect();
    println!("Input: {} words across {} documents", records.len(), documents.len());

    let output = MemoryOutput::new();
    let results = output.records();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(records)))
        .layer(4, inverted_index::job())
        .output(OutputSpec::new("", output))
        .run()
        .await?;

    let mut lines: Vec<String> = results.take().into_iter().map(|(_, line)| line).collect();
    lines.sort();

    println!("\n{} index entries:", count);
    for line in lines {
        println!("  {}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_inverted_index_demo().await {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
