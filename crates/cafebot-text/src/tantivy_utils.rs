use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Tokens longer than this are dropped before term weighting.
const MAX_TOKEN_LEN: usize = 40;

/// Lowercasing alphanumeric word tokenizer shared by fitting and querying.
/// Tokens over `MAX_TOKEN_LEN` bytes are removed, so they never enter the vocabulary.
pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
		.filter(LowerCaser)
		.build()
}

/// Runs `text` through `analyzer`, keeping tokens of two or more characters.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut stream = analyzer.token_stream(text);
	while stream.advance() {
		let token = &stream.token().text;
		if token.chars().count() >= 2 { tokens.push(token.clone()); }
	}
	tokens
}

/// Unigrams followed by space-joined bigrams, in token order.
pub fn unigrams_and_bigrams(tokens: &[String]) -> Vec<String> {
	let mut terms = tokens.to_vec();
	terms.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));
	terms
}
