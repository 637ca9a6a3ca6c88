pub fn normalize_ticker(ticker: &str) -> String {
    ticker.to_uppercase()
}
