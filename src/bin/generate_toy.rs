use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Write a synthetic query/document pair table for trying out `matchpack`.
#[derive(Parser)]
struct Args {
    #[arg(default_value = "toy_pairs.parquet")]
    output: PathBuf,
    /// Candidate documents per query.
    #[arg(long, default_value_t = 4)]
    candidates: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const TOPICS: [(&str, &[&str]); 4] = [
    ("rust", &["ownership", "borrow checker", "traits", "cargo"]),
    ("baking", &["sourdough", "oven", "yeast", "flour"]),
    ("travel", &["flights", "hotels", "visa", "luggage"]),
    ("music", &["guitar", "chords", "tempo", "synth"]),
];

fn query_text(topic: &str, term: &str) -> String {
    format!("how does {term} work in {topic}")
}

fn document_text(topic: &str, terms: &[&str], rng: &mut StdRng) -> String {
    let picked: Vec<&str> = terms.choose_multiple(rng, 2).copied().collect();
    format!("a guide to {topic}: {} and {}", picked[0], picked[1])
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    // One document per (topic, variant)
    let documents: Vec<(usize, String)> = TOPICS
        .iter()
        .enumerate()
        .flat_map(|(t, (topic, terms))| {
            (0..3)
                .map(|_| (t, document_text(topic, terms, &mut rng)))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut id_left = Vec::new();
    let mut text_left = Vec::new();
    let mut id_right = Vec::new();
    let mut text_right = Vec::new();
    let mut label = Vec::new();

    let mut query_no = 0;
    for (t, (topic, terms)) in TOPICS.iter().enumerate() {
        for term in terms.iter() {
            let qid = format!("q{query_no}");
            let query = query_text(topic, term);
            query_no += 1;
            for _ in 0..args.candidates {
                let d = rng.gen_range(0..documents.len());
                let (doc_topic, doc) = &documents[d];
                id_left.push(qid.clone());
                text_left.push(query.clone());
                id_right.push(format!("d{d}"));
                text_right.push(doc.clone());
                label.push(i64::from(*doc_topic == t));
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("id_left", DataType::Utf8, false),
        Field::new("text_left", DataType::Utf8, false),
        Field::new("id_right", DataType::Utf8, false),
        Field::new("text_right", DataType::Utf8, false),
        Field::new("label", DataType::Int64, false),
    ]));
    let rows = label.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(id_left)),
            Arc::new(StringArray::from(text_left)),
            Arc::new(StringArray::from(id_right)),
            Arc::new(StringArray::from(text_right)),
            Arc::new(Int64Array::from(label)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let file = std::fs::File::create(&args.output).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!(
        "Wrote {rows} pairs ({query_no} queries, {} documents) to {}",
        documents.len(),
        args.output.display()
    );
    Ok(())
}
