use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use safe_yaml_core::{Parser, Scanner};

fn large_document() -> String {
    let mut yaml = String::from("%YAML 1.1\n---\n");
    for i in 0..2000 {
        let _ = write!(
            yaml,
            "item{i}:\n  name: \"entry number {i}\"\n  count: {i}\n  ratio: {i}.5\n  \
             enabled: yes\n  tags: [a, b, 'c d']\n  note: |\n    literal text\n    on two lines\n"
        );
    }
    yaml
}

pub fn parser(c: &mut Criterion) {
    let yaml = large_document();
    let mut group = c.benchmark_group("large");
    group.throughput(Throughput::Bytes(yaml.len() as u64));

    group.bench_function("scan", |b| {
        b.iter(|| {
            let mut input = yaml.as_bytes();
            let mut scanner = Scanner::new();
            scanner.set_input(&mut input);
            black_box(scanner.count())
        })
    });

    group.bench_function("parse", |b| {
        b.iter(|| {
            let mut input = yaml.as_bytes();
            let mut parser = Parser::new();
            parser.set_input(&mut input);
            black_box(parser.count())
        })
    });

    group.bench_function("parse and resolve", |b| {
        b.iter(|| {
            let mut input = yaml.as_bytes();
            let mut parser = Parser::new();
            parser.set_input(&mut input);
            let mut resolved = 0;
            while let Ok(event) = parser.parse() {
                if let Ok(Some(_)) = parser.resolve(&event) {
                    resolved += 1;
                }
                if let safe_yaml_core::EventData::StreamEnd = event.data {
                    break;
                }
            }
            black_box(resolved)
        })
    });

    group.finish();
}

criterion_group!(benches, parser);
criterion_main!(benches);
