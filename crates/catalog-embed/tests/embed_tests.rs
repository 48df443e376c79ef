use catalog_core::config::EmbeddingSettings;
use catalog_embed::{get_default_embedder, FakeEmbedder, Embedder};

fn l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { fake: true, fake_dim: 128, ..EmbeddingSettings::default() };
    let embedder = get_default_embedder(&settings).expect("embedder");
    assert_eq!(embedder.dim(), 128);

    let texts = vec!["centrifugal pump".to_string(), "centrifugal pump".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    assert_eq!(embs[0].len(), 128);
    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in embs[0].iter().zip(embs[1].iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn fake_embedder_places_shared_tokens_closer() {
    let embedder = FakeEmbedder::new(256);
    let q = embedder.embed("centrifugal pump").unwrap();
    let near = embedder.embed("pump centrifugal").unwrap();
    let far = embedder.embed("rotary compressor").unwrap();
    assert!(l2(&q, &near) < 1e-6, "token order does not matter");
    assert!(l2(&q, &far) > l2(&q, &near));
}

/// Needs a real model directory: `APP_MODEL_DIR=models/all-MiniLM-L6-v2 cargo test -p catalog-embed -- --ignored`
#[ignore]
#[test]
fn sentence_embedder_loads_minilm() {
    let embedder = get_default_embedder(&EmbeddingSettings::default()).expect("model");
    let v = embedder.embed("centrifugal pump").expect("embed");
    assert_eq!(v.len(), embedder.dim());
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3);
}
