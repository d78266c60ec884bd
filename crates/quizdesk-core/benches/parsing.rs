use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizdesk_core::parser::{parse_quiz_str, validate_quiz};

fn quiz_toml(questions: usize) -> String {
    let mut toml = String::from(
        r#"[quiz]
code = "BENCH"
title = "Parsing benchmark"
time_limit_secs = 900
"#,
    );
    for i in 0..questions {
        let body = match i % 3 {
            0 => "type = \"single-choice\"\noptions = [\"3\", \"4\", \"5\", \"6\"]\nanswer = 1",
            1 => "type = \"true-false\"\nanswer = true",
            _ => "type = \"matching\"\npairs = [[\"H2O\", \"water\"], [\"NaCl\", \"salt\"]]",
        };
        toml.push_str(&format!(
            "\n[[questions]]\nid = \"q{i}\"\nprompt = \"Question {i}\"\n{body}\n"
        ));
    }
    toml
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_quiz");
    let path = Path::new("bench.toml");

    for n in [5, 50] {
        let content = quiz_toml(n);
        group.bench_function(format!("questions={n}"), |b| {
            b.iter(|| parse_quiz_str(black_box(&content), path))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let quiz = match parse_quiz_str(&quiz_toml(50), Path::new("bench.toml")) {
        Ok(quiz) => quiz,
        Err(e) => panic!("benchmark quiz failed to parse: {e:#}"),
    };

    c.bench_function("validate_quiz questions=50", |b| {
        b.iter(|| validate_quiz(black_box(&quiz)))
    });
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
