use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use cafebot_core::config::{Config, Settings};
use cafebot_core::feedback::{Feedback, FeedbackLog, FeedbackRecord};
use cafebot_core::loader::Dataset;
use cafebot_core::store::DocumentStore;
use cafebot_core::traits::Embedder;
use cafebot_embed::{get_default_embedder, get_default_scorer};
use cafebot_hybrid::{Answer, Assistant, ExtractiveGenerator, HybridRetriever, Reranker};
use cafebot_recommend::{RecommendationScorer, Weights};

fn load_store(config: &Config, settings: &Settings) -> Result<Arc<DocumentStore>> {
    let data = &settings.data;
    let dataset = Dataset::load(&config.path(&data.items_path), &config.path(&data.faq_path), &config.path(&data.orders_path))
        .context("loading dataset")?;
    let store = DocumentStore::build(&dataset.items, &dataset.faqs, &dataset.orders, &settings.chunking)?;
    Ok(Arc::new(store))
}

fn load_embedder(config: &Config, settings: &Settings) -> Result<Arc<dyn Embedder>> {
    get_default_embedder(&settings.embedding, &config.path(&settings.embedding.model_dir))
}

/// `cafebot index`: always rebuilds and overwrites the saved index.
pub fn index(config: &Config, settings: &Settings) -> Result<()> {
    let store = load_store(config, settings)?;
    let embedder = load_embedder(config, settings)?;
    let index_dir = config.path(&settings.data.index_dir);
    let mut retriever = HybridRetriever::build(store.clone(), embedder, settings)?;
    retriever.save(&index_dir)?;
    println!(
        "Indexed {} documents ({} lexical terms) into {}",
        store.len(),
        retriever.lexical_index().vocabulary_size(),
        index_dir.display()
    );
    Ok(())
}

pub struct App {
    assistant: Assistant,
    recommender: RecommendationScorer,
    feedback: FeedbackLog,
    settings: Settings,
}

impl App {
    pub fn open(config: &Config, settings: &Settings) -> Result<Self> {
        let store = load_store(config, settings)?;
        let embedder = load_embedder(config, settings)?;
        let index_dir = config.path(&settings.data.index_dir);
        let retriever = HybridRetriever::load_or_build(store.clone(), embedder.clone(), &index_dir, settings)?;
        let recommender =
            RecommendationScorer::with_embeddings(store, embedder, retriever.vector_index().vectors().to_vec())?;
        let scorer = get_default_scorer(&settings.reranker, &config.path(&settings.reranker.model_dir))?;
        let assistant = Assistant::new(
            Arc::new(retriever),
            Reranker::new(scorer),
            Box::new(ExtractiveGenerator),
            settings.retrieval.clone(),
        );
        let feedback = FeedbackLog::open(&config.path(&settings.data.feedback_log))?;
        info!(feedback_log = %feedback.path().display(), "cafebot ready");
        Ok(Self { assistant, recommender, feedback, settings: settings.clone() })
    }

    fn print_answer(&self, answer: &Answer) -> Result<()> {
        println!("Bot: {}", answer.text);
        if answer.sources.is_empty() {
            return Ok(());
        }
        println!("--- Sources ---");
        let store = self.assistant.retriever().store();
        for candidate in answer.sources.iter().take(self.settings.retrieval.sources_shown) {
            if let Some(doc) = store.get(candidate.ordinal) {
                println!("{}", serde_json::to_string_pretty(&doc.meta)?);
            }
        }
        Ok(())
    }

    pub fn ask(&self, question: &str, pref: Option<&str>) -> Result<()> {
        let answer = self.assistant.answer(question, pref)?;
        self.print_answer(&answer)
    }

    pub fn recommend(&self, preference: &str, k: usize) -> Result<()> {
        let weights = Weights::from(&self.settings.recommend);
        let recs = self.recommender.recommend(preference, k, weights)?;
        println!("Recommended items:");
        for r in recs {
            println!("{} score: {:.3}", r.meta.title(), r.score);
        }
        Ok(())
    }

    pub fn chat(&self) -> Result<()> {
        println!("CafeBot ready. Type 'quit' to exit. Use 'recommend: <prefs>' for suggestions, 'pref: <prefs>' to personalize answers.");
        let mut user_pref = String::new();
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("You: ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else { break };
            let query = line?.trim().to_string();
            if query.is_empty() {
                continue;
            }
            let lowered = query.to_lowercase();
            if lowered == "quit" || lowered == "exit" {
                break;
            }
            if lowered.starts_with("recommend:") {
                let pref = query.split_once(':').map(|(_, p)| p.trim()).unwrap_or_default();
                self.recommend(pref, self.settings.recommend.k)?;
                continue;
            }
            if lowered.starts_with("pref:") {
                user_pref = query.split_once(':').map(|(_, p)| p.trim().to_string()).unwrap_or_default();
                println!("Preferences set: {}", if user_pref.is_empty() { "(none)" } else { user_pref.as_str() });
                continue;
            }

            let pref = (!user_pref.is_empty()).then_some(user_pref.as_str());
            let answer = self.assistant.answer(&query, pref)?;
            self.print_answer(&answer)?;
            if answer.sources.is_empty() {
                continue;
            }

            print!("Was this helpful? [y/n] ");
            io::stdout().flush()?;
            let Some(reply) = lines.next() else { break };
            let feedback = match reply?.trim().to_lowercase().as_str() {
                "y" | "yes" => Feedback::Helpful,
                "n" | "no" => Feedback::Unhelpful,
                _ => continue,
            };
            self.feedback.append(&FeedbackRecord {
                query,
                answer: answer.text,
                feedback,
                context_docs: answer.context,
                user_pref: user_pref.clone(),
            })?;
        }
        Ok(())
    }
}
