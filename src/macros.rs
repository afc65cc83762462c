// Lazily parsed, process-wide CSS selector for a literal.
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: once_cell::sync::Lazy<scraper::Selector> = once_cell::sync::Lazy::new(|| {
            scraper::Selector::parse($css).expect(concat!("invalid selector: ", $css))
        });
        &*SELECTOR
    }};
}

// Lazily compiled, process-wide regex for a literal.
macro_rules! regex {
    ($re:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($re).expect(concat!("invalid regex: ", $re)));
        &*RE
    }};
}
