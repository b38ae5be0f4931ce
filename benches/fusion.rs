use ccg_brain::cognitive::SituationAnalysis;
use ccg_brain::fusion::FusionLayer;
use ccg_brain::{
    ActionSuggestion, Card, DecisionSource, FusionStrategy, GameAction, Play, PlayKind, Rank, Suit,
};

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(50)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        fusing_weighted_average,
        fusing_voting,
        fusing_cascade,
        fusing_adaptive,
        fusing_many_sources,
}

fn single(id: u16, rank: u8) -> GameAction {
    let card = Card::new(id, Rank::new(rank), Suit::Hearts);
    GameAction::play(Play::new([card], PlayKind::Single, Rank::new(rank)))
}

/// `n` modules spread over a handful of distinct plays.
fn sources(n: usize) -> Vec<DecisionSource> {
    (0..n)
        .map(|i| {
            let rank = 3 + (i % 5) as u8;
            let confidence = 0.4 + (i % 7) as f64 * 0.08;
            DecisionSource::new(
                format!("module-{}", i),
                ActionSuggestion::new(single(i as u16, rank), confidence, confidence, "bench"),
                0.2 + (i % 4) as f64 * 0.2,
            )
        })
        .collect()
}

fn fuse_with(c: &mut criterion::Criterion, label: &str, strategy: FusionStrategy, n: usize) {
    let layer = FusionLayer::default();
    let situation = SituationAnalysis::neutral(0.5);
    let candidates = sources(n);
    c.bench_function(label, |b| {
        b.iter(|| layer.fuse(strategy, candidates.clone(), &situation))
    });
}

fn fusing_weighted_average(c: &mut criterion::Criterion) {
    fuse_with(c, "fuse 4 sources by weighted average", FusionStrategy::WeightedAverage, 4);
}

fn fusing_voting(c: &mut criterion::Criterion) {
    fuse_with(c, "fuse 4 sources by voting", FusionStrategy::Voting, 4);
}

fn fusing_cascade(c: &mut criterion::Criterion) {
    fuse_with(c, "fuse 4 sources by cascade", FusionStrategy::Cascade, 4);
}

fn fusing_adaptive(c: &mut criterion::Criterion) {
    fuse_with(c, "fuse 4 sources adaptively", FusionStrategy::Adaptive, 4);
}

fn fusing_many_sources(c: &mut criterion::Criterion) {
    fuse_with(c, "fuse 64 sources adaptively", FusionStrategy::Adaptive, 64);
}
