use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quill_parser::lexer::{Scanner, TokenKind};
use quill_parser::{ParserOptions, compile, compile_with_opts, parse_many_parallel};

const COMPONENT: &str = r#"
import React, { useState, useEffect } from "react";

export default function List({ items = [], onSelect, ...rest }) {
    const [selected, setSelected] = useState(null);
    useEffect(() => { onSelect?.(selected); }, [selected]);
    return (
        <ul className="list" {...rest}>
            {items.map((item, i) => (
                <li key={item.id ?? i} onClick={() => setSelected(item)}>
                    {item.label} &mdash; {i + 1}
                </li>
            ))}
        </ul>
    );
}
"#;

const CLASSES: &str = r#"
export class Queue extends Base {
    static #count = 0;
    #items = [];
    static { Queue.#count = 0; }
    get size() { return this.#items.length; }
    async *drain() { while (this.#items.length) yield await this.#items.shift(); }
    push(...values) { this.#items.push(...values); Queue.#count += values.length; return this; }
}
"#;

fn repeat(source: &str, times: usize) -> String {
    // Declarations would clash when repeated, so wrap each copy in a block.
    let body = source.replace("export default ", "").replace("export ", "").replace("import React, { useState, useEffect } from \"react\";", "");
    (0..times).map(|_| format!("{{\n{body}\n}}\n")).collect()
}

// ---------------------------------------------------------------------------
// Tokenizing
// ---------------------------------------------------------------------------

fn bench_scanner(c: &mut Criterion) {
    let source = repeat(CLASSES, 50);
    let mut group = c.benchmark_group("scanner");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("tokens", |b| {
        b.iter(|| {
            let mut scanner = Scanner::new(black_box(&source));
            let mut count = 0usize;
            while let Ok(token) = scanner.next_token() {
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
                count += 1;
            }
            count
        });
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Full parses
// ---------------------------------------------------------------------------

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_component", |b| b.iter(|| compile(black_box(COMPONENT))));
    c.bench_function("parse_classes", |b| b.iter(|| compile(black_box(CLASSES))));

    let mut group = c.benchmark_group("parse_scaled");
    for times in [10, 100] {
        let source = repeat(COMPONENT, times);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(times), &source, |b, source| {
            b.iter(|| compile_with_opts(black_box(source), ParserOptions::default()));
        });
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let sources: Vec<&str> = std::iter::repeat_n(COMPONENT, 64).collect();
    c.bench_function("parse_many_parallel_64", |b| {
        b.iter(|| parse_many_parallel(black_box(&sources), ParserOptions::default()));
    });
}

criterion_group!(benches, bench_scanner, bench_parse, bench_parallel);
criterion_main!(benches);
