//! Ordered pattern tables behind the extractors.
//!
//! Each table is evaluated top to bottom and the first accepted match wins.
//! Keeping them as data lets tests walk every rule on its own.

use once_cell::sync::Lazy;
use regex::Regex;

use super::absolute_url;

pub struct Rule {
    pub name: &'static str,
    pub regex: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap_or_else(|e| panic!("rule {name}: {e}")),
        }
    }

    fn keywords(name: &'static str, words: &[&str]) -> Self {
        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Self::new(name, &format!(r"(?i)\b({alternation})\b"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub value: String,
}

/// Walks `rules` in order and returns the first capture `accept` agrees to.
///
/// Every match of a rule is tried before moving on to the next rule. The
/// reported value is capture group 1 when the rule has one.
pub fn first_match(
    rules: &[Rule],
    text: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<RuleMatch> {
    rules.iter().find_map(|rule| {
        rule.regex.captures_iter(text).find_map(|caps| {
            let value = caps.get(1).or_else(|| caps.get(0))?.as_str();
            accept(value).then(|| RuleMatch {
                rule: rule.name,
                value: value.to_string(),
            })
        })
    })
}

pub static PRICE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("dollar", r"\$([0-9,]+\.?[0-9]*)"),
        Rule::new("usd", r"(?i)USD\s*([0-9,]+\.?[0-9]*)"),
        Rule::new("labelled", r"(?i)Price:\s*\$([0-9,]+\.?[0-9]*)"),
    ]
});

pub static PART_NUMBER_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("labelled", r"(?i)(?:Part|P/N|PN|#)\s*:?\s*([A-Z0-9\-]{4,})"),
        Rule::new("letters-digits", r"(?i)\b([A-Z]{2,}[0-9]{3,}[A-Z0-9\-]*)\b"),
        Rule::new("digits-letters", r"(?i)\b([0-9]{3,}[A-Z]{2,}[A-Z0-9\-]*)\b"),
        Rule::new("long-token", r"(?i)\b([A-Z0-9\-]{6,})\b"),
    ]
});

/// Table rows carry bare upper-case codes in their own cells.
pub static ROW_PART_NUMBER_RULES: Lazy<Vec<Rule>> =
    Lazy::new(|| vec![Rule::new("row-token", r"\b([A-Z0-9\-]{6,})\b")]);

/// Cell price in table rows.
pub static ROW_PRICE_RULES: Lazy<Vec<Rule>> =
    Lazy::new(|| vec![Rule::new("dollar", r"\$([0-9,]+\.?[0-9]*)")]);

pub const OEM_BRANDS: &[&str] = &[
    "HONDA", "TOYOTA", "FORD", "CHEVROLET", "NISSAN", "BMW", "MERCEDES", "AUDI", "LEXUS", "ACURA",
    "INFINITI",
];

pub const AFTERMARKET_BRANDS: &[&str] = &[
    "BOSCH", "DENSO", "NGK", "MOBIL", "CASTROL", "VALVOLINE", "MONROE", "KYB", "BILSTEIN",
    "BREMBO", "ATE", "ZIMMERMANN", "DELPHI", "GATES", "DAYCO", "HOLSTEIN", "ULTRA-POWER",
    "AUTOTECNICA", "FAMOUS",
];

pub const TOOL_BRANDS: &[&str] = &[
    "CRAFTSMAN", "MATCO", "SNAP-ON", "MAC", "CORNWELL", "PROTO", "SK", "WILLIAMS", "WRIGHT",
    "GEARWRENCH", "STANLEY", "DEWALT", "MILWAUKEE", "KOBALT", "HUSKY",
];

pub static BRAND_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            "labelled",
            r"(?i:Brand|Mfg|Manufacturer)\s*:?\s*([A-Z][a-zA-Z&]+(?:\s[A-Z][a-zA-Z&]+)?)",
        ),
        Rule::keywords("oem", OEM_BRANDS),
        Rule::keywords("aftermarket", AFTERMARKET_BRANDS),
    ]
});

/// Row cells are matched against both keyword lists at once.
pub static ROW_BRAND_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let words: Vec<&str> = AFTERMARKET_BRANDS.iter().chain(OEM_BRANDS).copied().collect();
    vec![Rule::keywords("row", &words)]
});

pub static TOOL_BRAND_RULES: Lazy<Vec<Rule>> =
    Lazy::new(|| vec![Rule::keywords("tool", TOOL_BRANDS)]);

/// Words stripped from candidate names.
pub const NAME_NOISE: &[&str] = &["Related Parts", "Intentionally blank", "Info", "Fits", "Toggle"];

/// Link texts that are page controls rather than listings.
pub const UI_NOISE: &[&str] = &["show", "hide", "expand", "collapse", "toggle"];

/// The order number a status page repeats back, e.g. `Order #123456789`.
pub static ORDER_NUMBER_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![Rule::new(
        "order-number",
        r"(?i)\border\s*(?:number|no\.?)?\s*[:#]?\s*(\d{3,12})\b",
    )]
});

pub static ORDER_DATE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("order-date", r"(?i)order date[:\s]*(.+)"),
        Rule::new("placed", r"(?i)placed[:\s]*(.+)"),
        Rule::new("date", r"(?i)date[:\s]*(\d{1,2}/\d{1,2}/\d{4})"),
    ]
});

/// Rule names double as the carrier when the label is one.
pub static TRACKING_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            "tracking",
            r"(?i)tracking(?:\s+(?:number|no\.?))?[:\s#]*([A-Z0-9]{6,})",
        ),
        Rule::new("track", r"(?i)track[:\s#]*([A-Z0-9]{6,})"),
        Rule::new("UPS", r"(?i)\bups[:\s#]*([A-Z0-9]{6,})"),
        Rule::new("FedEx", r"(?i)\bfedex[:\s#]*([A-Z0-9]{6,})"),
        Rule::new("USPS", r"(?i)\busps[:\s#]*([A-Z0-9]{6,})"),
    ]
});

pub const CARRIERS: &[&str] = &["UPS", "FedEx", "USPS"];

pub static SHIPPING_COST_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("shipping", r"(?i)shipping[:\s]*(\$[\d,.]+)"),
        Rule::new("freight", r"(?i)freight[:\s]*(\$[\d,.]+)"),
    ]
});

pub static TOTAL_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("total", r"(?i)\btotal[:\s]*(\$[\d,.]+)"),
        Rule::new("amount", r"(?i)\bamount[:\s]*(\$[\d,.]+)"),
    ]
});

pub static SUBTOTAL_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("subtotal", r"(?i)subtotal[:\s]*(\$[\d,.]+)"),
        Rule::new("parts", r"(?i)\bparts[:\s]*(\$[\d,.]+)"),
    ]
});

pub struct VideoRule {
    pub rule: Rule,
    canonical: fn(&str) -> Option<String>,
}

impl VideoRule {
    pub fn canonical_url(&self, captured: &str) -> Option<String> {
        (self.canonical)(captured)
    }
}

pub static VIDEO_RULES: Lazy<Vec<VideoRule>> = Lazy::new(|| {
    vec![
        VideoRule {
            rule: Rule::new("youtube", r"(?i)youtube\.com/watch\?v=([a-zA-Z0-9_-]+)"),
            canonical: |id| Some(format!("https://www.youtube.com/watch?v={id}")),
        },
        VideoRule {
            rule: Rule::new("youtu.be", r"(?i)youtu\.be/([a-zA-Z0-9_-]+)"),
            canonical: |id| Some(format!("https://www.youtube.com/watch?v={id}")),
        },
        VideoRule {
            rule: Rule::new("vimeo", r"(?i)vimeo\.com/([0-9]+)"),
            canonical: |id| Some(format!("https://vimeo.com/{id}")),
        },
        VideoRule {
            rule: Rule::new("file", r#"(?i)([^\s"'<>()=]+\.(?:mp4|webm|mov))\b"#),
            canonical: absolute_url,
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn has_digit(s: &str) -> bool {
        s.chars().any(|c| c.is_ascii_digit())
    }

    #[rstest]
    #[case("dollar", "Only $1,249.99 today", "1,249.99")]
    #[case("usd", "USD 45.10 incl. tax", "45.10")]
    fn price_rule_matches(#[case] rule: &str, #[case] text: &str, #[case] expected: &str) {
        let m = first_match(&PRICE_RULES, text, |_| true).unwrap();
        assert_eq!(m.rule, rule);
        assert_eq!(m.value, expected);
    }

    #[rstest]
    #[case("labelled", "Rotor Part: BR9034 front", "BR9034")]
    #[case("letters-digits", "Gasket FEL26317 kit", "FEL26317")]
    #[case("digits-letters", "Filter 123AB45 oil", "123AB45")]
    #[case("long-token", "Coil 90919-02240 pack", "90919-02240")]
    fn part_number_rule_matches(#[case] rule: &str, #[case] text: &str, #[case] expected: &str) {
        let m = first_match(&PART_NUMBER_RULES, text, has_digit).unwrap();
        assert_eq!(m.rule, rule);
        assert_eq!(m.value, expected);
    }

    #[test]
    fn rejected_candidates_fall_through_to_later_matches() {
        let m = first_match(&PART_NUMBER_RULES, "Part: ABCD kit XY12345", has_digit).unwrap();
        assert_eq!(m.value, "XY12345");
    }

    #[rstest]
    #[case("labelled", "Brand: Wagner rotor", "Wagner")]
    #[case("oem", "Genuine Honda filter", "Honda")]
    #[case("aftermarket", "denso iridium plug", "denso")]
    fn brand_rule_matches(#[case] rule: &str, #[case] text: &str, #[case] expected: &str) {
        let m = first_match(&BRAND_RULES, text, |_| true).unwrap();
        assert_eq!(m.rule, rule);
        assert_eq!(m.value, expected);
    }

    #[rstest]
    #[case(&TRACKING_RULES, "UPS", "Shipped via UPS 1Z999AA1012", "1Z999AA1012")]
    #[case(&TOTAL_RULES, "total", "Order Total: $82.10", "$82.10")]
    #[case(&SUBTOTAL_RULES, "subtotal", "Subtotal: $70.00", "$70.00")]
    #[case(&ORDER_DATE_RULES, "order-date", "Order Date: 03/14/2024", "03/14/2024")]
    fn order_rule_matches(
        #[case] rules: &[Rule],
        #[case] rule: &str,
        #[case] text: &str,
        #[case] expected: &str,
    ) {
        let m = first_match(rules, text, |_| true).unwrap();
        assert_eq!(m.rule, rule);
        assert_eq!(m.value, expected);
    }

    #[test]
    fn total_does_not_read_subtotal_lines() {
        assert!(first_match(&TOTAL_RULES, "Subtotal: $70.00", |_| true).is_none());
    }

    #[test]
    fn brand_keywords_need_word_boundaries() {
        assert!(first_match(&BRAND_RULES, "stainless plate", |_| true).is_none());
    }

    #[rstest]
    #[case("https://youtube.com/watch?v=abc_123", "https://www.youtube.com/watch?v=abc_123")]
    #[case("see youtu.be/XYZ-9 now", "https://www.youtube.com/watch?v=XYZ-9")]
    #[case("vimeo.com/998877", "https://vimeo.com/998877")]
    #[case("src=/media/install.mp4 here", "https://www.rockauto.com/media/install.mp4")]
    fn video_rules_canonicalize(#[case] text: &str, #[case] expected: &str) {
        let url = VIDEO_RULES.iter().find_map(|v| {
            let m = first_match(std::slice::from_ref(&v.rule), text, |_| true)?;
            v.canonical_url(&m.value)
        });
        assert_eq!(url.as_deref(), Some(expected));
    }
}
