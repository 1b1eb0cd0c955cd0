use reabstract_openalex::{InvertedIndex, invert};

/// Abstract-sized payload: ~170 words with realistic repetition
fn sample_payload(words: usize) -> String {
    const VOCAB: [&str; 12] = [
        "the", "of", "in", "and", "lipid", "metabolism", "cancer", "a", "role", "FABP5", "to",
        "expression",
    ];
    let tokens: Vec<&str> = (0..words).map(|i| VOCAB[(i * 7 + i / 3) % VOCAB.len()]).collect();
    InvertedIndex::from_tokens(tokens).to_json()
}

fn sample_lines(n: usize) -> String {
    let payload = sample_payload(169);
    (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("https://openalex.org/W{i}"),
                "abstract_inverted_index": payload,
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[divan::bench(args = [50, 169, 1000])]
fn invert_payload(bencher: divan::Bencher, words: usize) {
    let payload = sample_payload(words);
    bencher.bench(|| invert(divan::black_box(&payload)).unwrap());
}

#[divan::bench(args = [1, 4])]
fn batch_lines(bencher: divan::Bencher, workers: usize) {
    let input = sample_lines(2_000);
    let config = reabstract_openalex::Config {
        workers,
        ..Default::default()
    };
    let cancel = std::sync::atomic::AtomicBool::new(false);
    bencher.bench(|| {
        let mut sink: Vec<reabstract_openalex::Reconstructed> = Vec::new();
        reabstract_openalex::process_lines(
            &mut input.as_bytes(),
            &config,
            &mut sink,
            &cancel,
            &indicatif::ProgressBar::hidden(),
            None,
        )
        .unwrap()
    });
}

fn main() {
    divan::main();
}
