use std::sync::Arc;

use cafebot_core::chunking::ChunkingConfig;
use cafebot_core::error::Error;
use cafebot_core::store::{DocumentStore, FaqRow, ItemRow, OrderStats};
use cafebot_core::traits::Embedder;
use cafebot_embed::HashEmbedder;
use cafebot_recommend::{RecommendationScorer, Weights};

fn item(id: &str, name: &str) -> ItemRow {
    ItemRow { item_id: id.to_string(), item_name: name.to_string() }
}

fn stats(id: &str, num_orders: u64, avg_rating: f32) -> OrderStats {
    OrderStats { item_id: id.to_string(), num_orders, avg_rating }
}

fn store() -> Arc<DocumentStore> {
    let items = vec![item("1", "iced caramel latte"), item("2", "hot chocolate"), item("3", "almond croissant")];
    let faqs = vec![FaqRow { question: "is there wifi".to_string(), answer: "yes".to_string() }];
    let orders = vec![stats("1", 10, 4.0), stats("2", 50, 3.0), stats("3", 30, 5.0)];
    Arc::new(DocumentStore::build(&items, &faqs, &orders, &ChunkingConfig::default()).expect("store"))
}

fn embedder() -> Arc<dyn Embedder> {
    Arc::new(HashEmbedder::new(64))
}

/// Answers every batch with one extra vector.
struct OverEager(HashEmbedder);

impl Embedder for OverEager {
    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = self.0.embed_batch(texts)?;
        vectors.push(vec![0.0; self.0.dim()]);
        Ok(vectors)
    }
}

fn scorer() -> RecommendationScorer {
    RecommendationScorer::new(store(), embedder(), 2).expect("scorer")
}

#[test]
fn normalized_signals_span_unit_interval() {
    let s = scorer();
    // Orders 10, 50, 30 and the FAQ's 0.
    assert_eq!(s.pop_norm(), &[0.2, 1.0, 0.6, 0.0]);
    assert_eq!(s.rating_norm(), &[0.8, 0.6, 1.0, 0.0]);
    for v in s.pop_norm().iter().chain(s.rating_norm()) {
        assert!((0.0..=1.0).contains(v));
    }
}

#[test]
fn constant_signal_normalizes_to_zero() {
    let items = vec![item("1", "latte"), item("2", "mocha")];
    let orders = vec![stats("1", 7, 4.5), stats("2", 7, 4.5)];
    let store = Arc::new(DocumentStore::build(&items, &[], &orders, &ChunkingConfig::default()).expect("store"));
    let s = RecommendationScorer::new(store, embedder(), 8).expect("scorer");
    assert_eq!(s.pop_norm(), &[0.0, 0.0]);
    assert_eq!(s.rating_norm(), &[0.0, 0.0]);

    // Every score ties at zero; ordinal decides.
    let recs = s.recommend("mocha", 2, Weights { alpha: 0.0, beta: 1.0, gamma: 1.0 }).expect("recommend");
    let order: Vec<usize> = recs.iter().map(|r| r.ordinal).collect();
    assert_eq!(order, vec![0, 1]);
}

#[test]
fn popularity_only_ignores_preference_text() {
    let s = scorer();
    let weights = Weights { alpha: 0.0, beta: 1.0, gamma: 0.0 };
    for pref in ["something sweet", "croissant", "iced latte please", ""] {
        let recs = s.recommend(pref, 4, weights).expect("recommend");
        let order: Vec<usize> = recs.iter().map(|r| r.ordinal).collect();
        assert_eq!(order, vec![1, 2, 0, 3], "preference {pref:?}");
        assert_eq!(recs[0].score, 1.0);
    }
}

#[test]
fn similarity_dominates_with_alpha_only() {
    let s = scorer();
    let recs = s.recommend("almond croissant", 1, Weights { alpha: 1.0, beta: 0.0, gamma: 0.0 }).expect("recommend");
    assert_eq!(recs[0].ordinal, 2);
    assert!((recs[0].similarity - 1.0).abs() < 1e-5);
    assert!((recs[0].score - recs[0].similarity).abs() < 1e-6);
}

#[test]
fn k_bounds_the_result() {
    let s = scorer();
    assert_eq!(s.recommend("latte", 2, Weights::default()).expect("recommend").len(), 2);
    assert_eq!(s.recommend("latte", 10, Weights::default()).expect("recommend").len(), 4);
    assert!(s.recommend("latte", 0, Weights::default()).expect("recommend").is_empty());
}

#[test]
fn reused_embeddings_must_align_with_store() {
    let store = store();
    let e = embedder();
    let vectors = e.embed_batch(&store.texts()).expect("embed");

    let reused = RecommendationScorer::with_embeddings(store.clone(), e.clone(), vectors.clone()).expect("scorer");
    let fresh = RecommendationScorer::new(store.clone(), e.clone(), 3).expect("scorer");
    let a = reused.recommend("hot drink", 4, Weights::default()).expect("recommend");
    let b = fresh.recommend("hot drink", 4, Weights::default()).expect("recommend");
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert!((x.score - y.score).abs() < 1e-5);
        assert_eq!(x.meta, y.meta);
    }

    let short = vectors[..2].to_vec();
    assert!(matches!(
        RecommendationScorer::with_embeddings(store, e, short),
        Err(Error::DimensionMismatch(_))
    ));
}

#[test]
fn preference_must_embed_to_exactly_one_vector() {
    let store = store();
    let e = HashEmbedder::new(64);
    let vectors = e.embed_batch(&store.texts()).expect("embed");
    let s = RecommendationScorer::with_embeddings(store, Arc::new(OverEager(e)), vectors).expect("scorer");
    assert!(matches!(s.recommend("latte", 2, Weights::default()), Err(Error::Collaborator(_))));
}
