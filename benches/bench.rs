// Criterion benchmarks for the matching pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use provider_match::core::{
    combine, geo_score, DecayConstants, GeoScore, ImpactClassifier, ImpactLevel, Matcher, ScoringConfig,
    WeightPolicy,
};
use provider_match::models::{Need, Provider};
use provider_match::services::{CityGazetteer, CosineSimilarity};
use std::sync::Arc;

const CITIES: [&str; 6] = ["Paris", "Lyon", "Marseille", "Bordeaux", "Versailles", "Lille"];
const DIMENSIONS: usize = 384;

fn embedding(seed: usize) -> Vec<f32> {
    (0..DIMENSIONS)
        .map(|i| (((seed * 31 + i * 17) % 97) as f32 / 97.0) - 0.3)
        .collect()
}

fn create_need(id: usize) -> Need {
    Need {
        id: format!("need-{}", id),
        major_category: "Besoins de dernière minute".to_string(),
        sub_category: "Garde d'enfant".to_string(),
        description: String::new(),
        city: Some(CITIES[id % CITIES.len()].to_string()),
        urgency: None,
        embedding: embedding(id),
    }
}

fn create_provider(id: usize) -> Provider {
    Provider {
        id: format!("provider-{}", id),
        company_name: format!("Company {}", id),
        expertise_domains: vec![],
        description: String::new(),
        city: Some(CITIES[(id * 7) % CITIES.len()].to_string()),
        availability: String::new(),
        embedding: embedding(id + 1000),
    }
}

fn create_matcher() -> Matcher {
    Matcher::new(
        ScoringConfig::default(),
        Arc::new(ImpactClassifier::builtin().unwrap()),
        Arc::new(CityGazetteer::builtin().unwrap()),
        Arc::new(CosineSimilarity),
    )
}

fn bench_scoring(c: &mut Criterion) {
    let decay = DecayConstants::default();
    let policy = WeightPolicy::default();

    c.bench_function("geo_score", |b| {
        b.iter(|| geo_score(black_box(Some(42.0)), black_box(ImpactLevel::Critical), &decay));
    });

    c.bench_function("combine", |b| {
        b.iter(|| {
            combine(
                black_box(0.8),
                black_box(GeoScore::Proximity(0.6)),
                black_box(ImpactLevel::Critical),
                &policy,
            )
        });
    });
}

fn bench_find_providers(c: &mut Criterion) {
    let matcher = create_matcher();
    let need = create_need(1);

    let mut group = c.benchmark_group("find_providers");

    for provider_count in [10, 100, 1000, 5000].iter() {
        let providers: Vec<Provider> = (0..*provider_count).map(create_provider).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(provider_count),
            provider_count,
            |b, _| {
                b.iter(|| matcher.find_providers(black_box(&need), black_box(&providers)));
            },
        );
    }

    group.finish();
}

fn bench_batch_match(c: &mut Criterion) {
    let matcher = create_matcher();
    let needs: Vec<Need> = (0..100).map(create_need).collect();
    let providers: Vec<Provider> = (0..500).map(create_provider).collect();

    c.bench_function("batch_match_100x500", |b| {
        b.iter(|| matcher.batch_match(black_box(&needs), black_box(&providers)));
    });
}

criterion_group!(benches, bench_scoring, bench_find_providers, bench_batch_match);

criterion_main!(benches);
