//! Recognition of CAPTCHA and block pages served in place of content.
//!
//! Site-specific and best-effort: the markers change whenever the site
//! changes vendors.

const CHALLENGE_MARKERS: &[&str] = &[
    "g-recaptcha",
    "h-captcha",
    "cf-challenge",
    "cf-chl-",
    "attention required! | cloudflare",
    "unusual traffic from your computer",
    "please verify you are a human",
];

/// The first challenge marker found in `body`, if any.
pub fn detect_challenge(body: &str) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    CHALLENGE_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}
