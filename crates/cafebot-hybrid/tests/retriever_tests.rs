use std::collections::HashSet;
use std::sync::Arc;

use cafebot_core::chunking::ChunkingConfig;
use cafebot_core::config::Settings;
use cafebot_core::error::Error;
use cafebot_core::store::{DocumentStore, FaqRow, ItemRow, OrderStats};
use cafebot_core::traits::Embedder;
use cafebot_core::types::{Ordinal, SearchHit, SourceKind};
use cafebot_embed::HashEmbedder;
use cafebot_hybrid::{fuse, HybridRetriever};
use cafebot_text::LexicalIndex;
use cafebot_vector::VectorIndex;

fn store() -> Arc<DocumentStore> {
    let items = vec![
        ItemRow { item_id: "1".to_string(), item_name: "iced caramel latte".to_string() },
        ItemRow { item_id: "2".to_string(), item_name: "hot chocolate".to_string() },
        ItemRow { item_id: "3".to_string(), item_name: "almond croissant".to_string() },
    ];
    let faqs = vec![
        FaqRow { question: "what time do you open".to_string(), answer: "we open at 8 am every day".to_string() },
        FaqRow { question: "do you have vegan options".to_string(), answer: "yes, oat milk and vegan muffins".to_string() },
        FaqRow { question: "is there wifi".to_string(), answer: "free wifi for all guests".to_string() },
    ];
    let orders = vec![OrderStats { item_id: "1".to_string(), num_orders: 120, avg_rating: 4.6 }];
    Arc::new(DocumentStore::build(&items, &faqs, &orders, &ChunkingConfig::default()).expect("store"))
}

fn embedder() -> Arc<dyn Embedder> {
    Arc::new(HashEmbedder::new(64))
}

fn retriever() -> HybridRetriever {
    HybridRetriever::build(store(), embedder(), &Settings::default()).expect("retriever")
}

fn ordinals<T>(items: &[T], f: impl Fn(&T) -> Ordinal) -> Vec<Ordinal> {
    items.iter().map(f).collect()
}

#[test]
fn fusion_scenario_ranks_one_zero_two() {
    let dense: Vec<SearchHit> = [(0, 0.9), (1, 0.5), (2, 0.1)]
        .iter()
        .map(|&(ordinal, score)| SearchHit { ordinal, score, source: SourceKind::Vector })
        .collect();
    // Ordinal 0 has no lexical overlap, so it is absent from the sparse hits.
    let sparse: Vec<SearchHit> = [(1, 0.8), (2, 0.2)]
        .iter()
        .map(|&(ordinal, score)| SearchHit { ordinal, score, source: SourceKind::Text })
        .collect();

    let fused = fuse(&dense, &sparse, 0.6, 3);
    assert_eq!(ordinals(&fused, |c| c.ordinal), vec![1, 0, 2]);
    let expected = [0.62f32, 0.54, 0.14];
    for (c, e) in fused.iter().zip(expected) {
        assert!((c.fused_score - e).abs() < 1e-6, "{} vs {}", c.fused_score, e);
    }
    assert_eq!(fused[1].sparse_score, 0.0);
}

#[test]
fn results_are_unique_and_bounded_by_k() {
    let r = retriever();
    for k in 0..=8 {
        let hits = r.hybrid_search("vegan oat milk latte", k, 0.6).expect("search");
        assert!(hits.len() <= k);
        let unique: HashSet<Ordinal> = hits.iter().map(|c| c.ordinal).collect();
        assert_eq!(unique.len(), hits.len());
        assert!(hits.iter().all(|c| c.ordinal < r.store().len()));
        assert!(hits.windows(2).all(|w| w[0].fused_score >= w[1].fused_score));
    }
}

#[test]
fn alpha_one_matches_dense_ranking() {
    let r = retriever();
    for query in ["what time do you open", "chocolate", "wifi for guests"] {
        let dense = r.dense_search(query, 3).expect("dense");
        let hybrid = r.hybrid_search(query, 3, 1.0).expect("hybrid");
        assert_eq!(ordinals(&hybrid, |c| c.ordinal), ordinals(&dense, |h| h.ordinal), "query {query}");
    }
}

#[test]
fn alpha_zero_matches_sparse_ranking() {
    let r = retriever();
    let query = "do you have vegan muffins";
    let sparse = r.sparse_search(query, 4).expect("sparse");
    assert!(!sparse.is_empty());
    let hybrid = r.hybrid_search(query, 4, 0.0).expect("hybrid");

    let positive: Vec<_> = hybrid.iter().filter(|c| c.sparse_score > 0.0).collect();
    assert_eq!(positive.len(), sparse.len());
    for (c, h) in positive.iter().zip(&sparse) {
        assert_eq!(c.fused_score, h.score);
    }
    // Positive-sparse candidates lead the list.
    assert!(hybrid[..positive.len()].iter().all(|c| c.sparse_score > 0.0));
}

#[test]
fn missing_side_is_filled_with_zero() {
    let r = retriever();
    let query = "free wifi";
    let k = 4;
    let dense: HashSet<Ordinal> = r.dense_search(query, 2 * k).expect("dense").iter().map(|h| h.ordinal).collect();
    let sparse: HashSet<Ordinal> = r.sparse_search(query, 2 * k).expect("sparse").iter().map(|h| h.ordinal).collect();

    for c in r.hybrid_search(query, k, 0.6).expect("hybrid") {
        if !sparse.contains(&c.ordinal) {
            assert_eq!(c.sparse_score, 0.0);
        }
        if !dense.contains(&c.ordinal) {
            assert_eq!(c.dense_score, 0.0);
        }
        assert!(c.rerank_score.is_none());
    }
}

#[test]
fn alpha_outside_unit_interval_is_rejected() {
    let r = retriever();
    assert!(matches!(r.hybrid_search("latte", 3, 1.5), Err(Error::InvalidConfig(_))));
    assert!(matches!(r.hybrid_search("latte", 3, -0.1), Err(Error::InvalidConfig(_))));
}

#[test]
fn misaligned_indexes_are_refused() {
    let store = store();
    let e = embedder();
    let texts = store.texts();
    let mut vector = VectorIndex::new(e.dim());
    vector.build(e.embed_batch(&texts).expect("embed"), store.metas()).expect("build");
    let lexical = LexicalIndex::fit(&texts[..3], 100).expect("fit");

    let result = HybridRetriever::new(store.clone(), vector, lexical, e);
    assert!(matches!(result, Err(Error::Misaligned { documents: 6, vectors: 6, lexical: 3 })));
}

#[test]
fn embedder_dimension_must_match_index() {
    let store = store();
    let texts = store.texts();
    let e = embedder();
    let mut vector = VectorIndex::new(e.dim());
    vector.build(e.embed_batch(&texts).expect("embed"), store.metas()).expect("build");
    let lexical = LexicalIndex::fit(&texts, 100).expect("fit");

    let other: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
    let result = HybridRetriever::new(store, vector, lexical, other);
    assert!(matches!(result, Err(Error::DimensionMismatch(_))));
}

#[test]
fn saved_index_is_reused_and_rebuilt_when_stale() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let settings = Settings::default();
    let mut built = retriever();
    built.save(tmp.path()).expect("save");

    let restored = HybridRetriever::from_saved(store(), embedder(), tmp.path(), &settings).expect("from_saved");
    let query = "open every day";
    assert_eq!(
        restored.hybrid_search(query, 5, 0.6).expect("search"),
        built.hybrid_search(query, 5, 0.6).expect("search")
    );

    let items = vec![ItemRow { item_id: "9".to_string(), item_name: "matcha".to_string() }];
    let changed = Arc::new(DocumentStore::build(&items, &[], &[], &ChunkingConfig::default()).expect("store"));
    assert!(matches!(
        HybridRetriever::from_saved(changed.clone(), embedder(), tmp.path(), &settings),
        Err(Error::StaleIndex(_))
    ));

    let rebuilt = HybridRetriever::load_or_build(changed.clone(), embedder(), tmp.path(), &settings).expect("rebuild");
    assert_eq!(rebuilt.vector_index().len(), 1);
    assert!(HybridRetriever::from_saved(changed, embedder(), tmp.path(), &settings).is_ok());
}

#[test]
fn saved_index_with_outdated_order_stats_is_rebuilt() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let settings = Settings::default();
    let items = vec![
        ItemRow { item_id: "1".to_string(), item_name: "latte".to_string() },
        ItemRow { item_id: "2".to_string(), item_name: "mocha".to_string() },
    ];
    let with_orders = |num_orders: u64| {
        let orders = vec![OrderStats { item_id: "1".to_string(), num_orders, avg_rating: 4.0 }];
        Arc::new(DocumentStore::build(&items, &[], &orders, &ChunkingConfig::default()).expect("store"))
    };

    let old = with_orders(10);
    HybridRetriever::build(old, embedder(), &settings).expect("build").save(tmp.path()).expect("save");

    let current = with_orders(999);
    assert!(matches!(
        HybridRetriever::from_saved(current.clone(), embedder(), tmp.path(), &settings),
        Err(Error::StaleIndex(_))
    ));

    let rebuilt = HybridRetriever::load_or_build(current.clone(), embedder(), tmp.path(), &settings).expect("rebuild");
    assert_eq!(rebuilt.vector_index().metas(), current.metas().as_slice());
    let hits = rebuilt.vector_index().search(&embedder().embed_batch(&["latte".to_string()]).expect("embed")[0], 1).expect("search");
    assert_eq!(hits[0].meta.num_orders(), 999);

    let reloaded = HybridRetriever::from_saved(current.clone(), embedder(), tmp.path(), &settings).expect("from_saved");
    assert_eq!(reloaded.vector_index().metas(), current.metas().as_slice());
}
