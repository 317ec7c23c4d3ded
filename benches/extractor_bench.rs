use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serial_telemetry::*;
use tokio::runtime::Runtime;

fn create_telemetry(count: usize) -> String {
    let mut data = String::new();
    for i in 0..count {
        data.push_str(&format!(
            r#"{{"data":{{"potentiometer_1":{}.{},"seq":{}}}}}"#,
            i % 7,
            i % 100,
            i
        ));
    }
    data
}

/// Cuts `data` at random points, the way a serial read loop would.
fn random_chunks(data: &str, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let chars: Vec<char> = data.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + rng.gen_range(1..=64)).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start = end;
    }
    chunks
}

async fn extract(chunks: Vec<String>, framing: Framing) -> usize {
    let source = tokio_stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
    let config = ExtractorConfig {
        framing,
        ..Default::default()
    };
    let mut extractor = FrameExtractor::with_config(source, config);
    let mut parsed = 0;
    while let Ok(Some(_)) = extractor.next_frame().await {
        parsed += 1;
    }
    parsed
}

fn extraction_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("frame_extraction");
    group.sample_size(10);

    for count in [100, 1000, 10_000].iter() {
        let data = create_telemetry(*count);
        let chunks = random_chunks(&data, 42);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for framing in [Framing::WholeBuffer, Framing::BraceBalanced] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", framing), count),
                &chunks,
                |b, chunks| {
                    b.iter(|| rt.block_on(extract(chunks.clone(), framing)));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, extraction_benchmark);
criterion_main!(benches);
