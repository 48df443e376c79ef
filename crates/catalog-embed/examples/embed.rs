use catalog_embed::{resolve_model_dir, Embedder, SentenceEmbedder};

// Embed a few names with the local model and print their pairwise squared distances.
// Usage:
//   cargo run -p catalog-embed --example embed -- [MODEL_DIR]

fn main() -> anyhow::Result<()> {
    let configured = std::env::args().nth(1);
    let model_dir = resolve_model_dir(configured.as_deref())?;
    let embedder = SentenceEmbedder::load(&model_dir, 256)?;
    let texts = vec![
        "centrifugal pump".to_string(),
        "water pump".to_string(),
        "rotary compressor".to_string(),
    ];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    for (i, a) in embs.iter().enumerate() {
        for (j, b) in embs.iter().enumerate().skip(i + 1) {
            let d: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
            println!("{:>20} <-> {:<20} {:.4}", texts[i], texts[j], d);
        }
    }
    Ok(())
}
