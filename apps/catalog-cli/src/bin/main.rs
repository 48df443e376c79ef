use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use catalog_core::config::{Config, Settings};
use catalog_core::normalize::clean_text;
use catalog_core::traits::{Embedder, VectorIndex};
use catalog_core::types::{CatalogEntry, SearchResult};
use catalog_core::CatalogMapping;
use catalog_embed::get_default_embedder;
use catalog_hybrid::{CatalogMatcher, HybridMatcher};
use catalog_text::Bm25Ranker;
use catalog_vector::FlatIndex;

#[derive(Parser)]
#[command(name = "catalog-cli", version, about = "Match free-text queries against an item catalog")]
struct Cli {
    /// Directory holding config.toml and its environment overlays
    #[arg(long, env = "CATALOG_CONFIG_DIR", default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a raw catalog, embed it and write the mapping and index artifacts
    Build {
        /// JSON array of {"id": ..., "name": ...}
        #[arg(long)]
        input: PathBuf,

        /// Also write the embeddings to a LanceDB directory
        #[cfg(feature = "lance")]
        #[arg(long)]
        lance_dir: Option<PathBuf>,
    },
    /// Print calibrated matches for a query as JSON
    Query {
        text: String,

        #[arg(long)]
        top_k: Option<usize>,

        /// Search a LanceDB directory instead of the flat index
        #[cfg(feature = "lance")]
        #[arg(long)]
        lance_dir: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
struct RawItem {
    id: i64,
    name: String,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    results: Vec<SearchResult>,
}

#[cfg(feature = "lance")]
const LANCE_TABLE: &str = "catalog";

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CATALOG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir).context("loading configuration")?;
    let settings = config.settings()?;

    match cli.command {
        #[cfg(not(feature = "lance"))]
        Command::Build { input } => build(&config, &settings, &input).map(|_| ()),
        #[cfg(feature = "lance")]
        Command::Build { input, lance_dir } => {
            let vectors = build(&config, &settings, &input)?;
            if let Some(dir) = lance_dir {
                write_lance(&dir, &vectors)?;
            }
            Ok(())
        }
        #[cfg(not(feature = "lance"))]
        Command::Query { text, top_k } => {
            let matcher = CatalogMatcher::open(&config)?;
            query(&matcher, &text, top_k)
        }
        #[cfg(feature = "lance")]
        Command::Query { text, top_k, lance_dir } => match lance_dir {
            Some(dir) => {
                let matcher = open_lance_matcher(&config, &settings, &dir)?;
                query(&matcher, &text, top_k)
            }
            None => {
                let matcher = CatalogMatcher::open(&config)?;
                query(&matcher, &text, top_k)
            }
        },
    }
}

fn read_raw_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let items: Vec<RawItem> = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(position, item)| CatalogEntry { position, id: item.id, name: item.name })
        .collect())
}

/// Embeds the cleaned form of each name; the mapping keeps the raw name.
fn embed_names(embedder: &dyn Embedder, mapping: &CatalogMapping) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(mapping.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} names ({percent}%)")?
            .progress_chars("#>-"),
    );
    let mut vectors = Vec::with_capacity(mapping.len());
    for entry in mapping.iter() {
        let v = embedder
            .embed(&clean_text(&entry.name))
            .with_context(|| format!("embedding position {} ({})", entry.position, entry.name))?;
        vectors.push(v);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(vectors)
}

/// Writes both artifacts and returns the embeddings in position order.
fn build(config: &Config, settings: &Settings, input: &Path) -> Result<Vec<Vec<f32>>> {
    let mapping = CatalogMapping::from_entries(read_raw_catalog(input)?)?;
    info!(input = %input.display(), entries = mapping.len(), "raw catalog read");

    let embedder = get_default_embedder(&settings.embedding)?;
    let vectors = embed_names(embedder.as_ref(), &mapping)?;
    let index = FlatIndex::from_vectors(embedder.dim(), &vectors)?;

    let mapping_path = config.resolve(&settings.catalog.mapping_path);
    let index_path = config.resolve(&settings.catalog.index_path);
    mapping.save(&mapping_path)?;
    index.save(&index_path)?;
    info!(
        mapping = %mapping_path.display(),
        index = %index_path.display(),
        rows = index.len(),
        dim = index.dim(),
        "artifacts written"
    );
    Ok(vectors)
}

fn query<V: VectorIndex>(matcher: &HybridMatcher<Bm25Ranker, V>, text: &str, top_k: Option<usize>) -> Result<()> {
    let results = matcher.hybrid_search(text, top_k.unwrap_or(matcher.default_top_k()))?;
    let out = QueryOutput { query: text, results };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(feature = "lance")]
fn write_lance(dir: &Path, vectors: &[Vec<f32>]) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    let uri = dir.to_string_lossy();
    tokio::runtime::Runtime::new()?.block_on(catalog_vector::writer::write_vectors(&uri, LANCE_TABLE, vectors))
}

#[cfg(feature = "lance")]
fn open_lance_matcher(
    config: &Config,
    settings: &Settings,
    dir: &Path,
) -> Result<HybridMatcher<Bm25Ranker, catalog_vector::LanceIndex>> {
    let catalog = CatalogMapping::load(&config.resolve(&settings.catalog.mapping_path))?;
    let lexical = Bm25Ranker::new(catalog.names(), catalog_text::Bm25Params::from(&settings.lexical));
    let vector = catalog_vector::LanceIndex::open(&dir.to_string_lossy(), LANCE_TABLE)?;
    let embedder = get_default_embedder(&settings.embedding)?;
    Ok(HybridMatcher::new(catalog, lexical, vector, embedder)?.with_default_top_k(settings.search.default_top_k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path) {
        fs::write(
            dir.join("config.toml"),
            "[catalog]\nmapping_path = \"out/mapping.json\"\nindex_path = \"out/index.json\"\n[embedding]\nfake = true\nfake_dim = 16\n",
        )
        .unwrap();
    }

    #[test]
    fn raw_catalog_keeps_names_in_input_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("raw.json");
        fs::write(&path, r#"[{"id": 9, "name": "Bomba Centrífuga"}, {"id": 4, "name": "Compresor-Rotativo"}]"#).unwrap();
        let entries = read_raw_catalog(&path).unwrap();
        assert_eq!(entries[0], CatalogEntry { position: 0, id: 9, name: "Bomba Centrífuga".into() });
        assert_eq!(entries[1], CatalogEntry { position: 1, id: 4, name: "Compresor-Rotativo".into() });
    }

    #[test]
    fn build_embeds_cleaned_names_but_matches_raw_names() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path());
        let input = tmp.path().join("raw.json");
        fs::write(
            &input,
            r#"[{"id": 1, "name": "Compresor-Rotativo"}, {"id": 2, "name": "Bomba Centrífuga"}, {"id": 3, "name": "Fan"}]"#,
        )
        .unwrap();

        let config = Config::load_from(tmp.path()).unwrap();
        let settings = config.settings().unwrap();
        let vectors = build(&config, &settings, &input).unwrap();
        let fake = catalog_embed::FakeEmbedder::new(16);
        assert_eq!(vectors[1], fake.embed("bomba centrifuga").unwrap());

        let matcher = CatalogMatcher::open(&config).unwrap();
        assert_eq!(matcher.catalog().entry_at(1).unwrap().name, "Bomba Centrífuga");

        let lexical = matcher.lexical_search("Compresor-Rotativo", 3).unwrap();
        assert_eq!(lexical[0].id, 1);
        assert_eq!(lexical[0].name, "Compresor-Rotativo");
        assert!(lexical[0].score > 0.0, "exact raw name must match lexically");
    }

    #[test]
    fn build_then_open_matcher() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path());
        let input = tmp.path().join("raw.json");
        fs::write(
            &input,
            r#"[{"id": 1, "name": "Centrifugal Pump"}, {"id": 2, "name": "Rotary Compressor"}, {"id": 3, "name": "Centrifugal Fan"}]"#,
        )
        .unwrap();

        let config = Config::load_from(tmp.path()).unwrap();
        let settings = config.settings().unwrap();
        let vectors = build(&config, &settings, &input).unwrap();
        assert_eq!(vectors.len(), 3);

        let matcher = CatalogMatcher::open(&config).unwrap();
        let results = matcher.hybrid_search("centrifugal pump", 2).unwrap();
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].name, "Centrifugal Pump");
    }
}
