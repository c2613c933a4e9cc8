use criterion::{criterion_group, criterion_main, Criterion};
use magicstream::catalog::models::Ranking;
use magicstream::config::{default_config_content, Config, SentimentConfig};
use magicstream::sentiment::render_prompt;
use std::hint::black_box;

fn bench_config_parsing(c: &mut Criterion) {
    let starter = default_config_content("access-fallback", "refresh-fallback");
    c.bench_function("config_from_starter_toml", |b| {
        b.iter(|| toml::from_str::<Config>(black_box(&starter)))
    });

    let config = Config::default();
    c.bench_function("config_to_toml", |b| {
        b.iter(|| toml::to_string(black_box(&config)))
    });

    let toml_str = toml::to_string(&config).unwrap();
    c.bench_function("config_from_toml", |b| {
        b.iter(|| toml::from_str::<Config>(black_box(&toml_str)))
    });
}

fn bench_prompt_rendering(c: &mut Criterion) {
    let template = SentimentConfig::default().prompt_template;
    let rankings: Vec<Ranking> = ["Excellent", "Good", "Okay", "Bad", "Terrible"]
        .iter()
        .enumerate()
        .map(|(i, name)| Ranking {
            ranking_value: i as i32 + 1,
            ranking_name: name.to_string(),
        })
        .chain(std::iter::once(Ranking::unranked()))
        .collect();

    c.bench_function("render_review_prompt", |b| {
        b.iter(|| render_prompt(black_box(&template), black_box(&rankings), "A tense, sweeping western"))
    });
}

criterion_group!(benches, bench_config_parsing, bench_prompt_rendering);
criterion_main!(benches);
