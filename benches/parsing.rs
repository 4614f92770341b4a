use criterion::{black_box, criterion_group, criterion_main, Criterion};
use inkdown::{parse, to_html};

const DOCUMENT: &str = r#"# Release notes

Version *2.1* ships the new **ingest pipeline** and a `--dry-run` flag.

## Changes

- faster [reference](https://example.com/docs) resolution
- tables now honor alignment:

| name | count |
|:-----|------:|
| jobs | 1042  |
| errs | 3     |

> [!WARNING]
> The old config format is deprecated[^legacy].

```toml
[ingest]
workers = 8
```

[^legacy]: removal is planned for 3.0.
"#;

fn bench_document(c: &mut Criterion) {
    c.bench_function("parse_document", |b| b.iter(|| parse(black_box(DOCUMENT))));
    c.bench_function("render_document", |b| b.iter(|| to_html(black_box(DOCUMENT))));
}

fn bench_adversarial(c: &mut Criterion) {
    let flood = format!("{}text{}", "*".repeat(10_000), "*".repeat(10_000));
    c.bench_function("parse_delimiter_flood", |b| {
        b.iter(|| parse(black_box(&flood)))
    });
}

criterion_group!(benches, bench_document, bench_adversarial);
criterion_main!(benches);
