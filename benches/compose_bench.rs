// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use courier::http::{encode_body, merge, Body, JsonBody, MultipartPart, OptionMap, ParamValue};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn header_merge_benchmark(c: &mut Criterion) {
    let base: OptionMap<String> = (0..16)
        .map(|i| (format!("X-Default-{}", i), i.to_string()))
        .collect();
    let overrides: OptionMap<String> = (8..24)
        .map(|i| (format!("x-default-{}", i), "override".to_string()))
        .collect();

    c.bench_function("merge_headers", |b| {
        b.iter(|| black_box(merge(black_box(&base), black_box(&overrides))))
    });
}

fn body_encoding_benchmark(c: &mut Criterion) {
    let form: OptionMap<ParamValue> = (0..20)
        .map(|i| (format!("field{}", i), ParamValue::from(i)))
        .collect();
    let form = Body::Form(form);
    let json = Body::Json(JsonBody::from(serde_json::json!({
        "name": "courier",
        "tags": ["http", "client"],
        "nested": {"depth": 2, "enabled": true}
    })));
    let multipart = Body::Multipart(vec![
        MultipartPart::new("meta", "{}"),
        MultipartPart::new("file", vec![0u8; 4096]).file_name("blob.bin"),
    ]);

    c.bench_function("encode_form", |b| b.iter(|| black_box(encode_body(&form))));
    c.bench_function("encode_json", |b| b.iter(|| black_box(encode_body(&json))));
    c.bench_function("encode_multipart", |b| {
        b.iter(|| black_box(encode_body(&multipart)))
    });
}

criterion_group!(benches, header_merge_benchmark, body_encoding_benchmark);
criterion_main!(benches);
