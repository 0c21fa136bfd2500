/// Tokenize text by lowercasing and splitting on whitespace.
///
/// The same function is used for corpus passages and incoming queries so
/// that lexical matching stays consistent. Tokens are treated as opaque
/// strings everywhere downstream.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}
