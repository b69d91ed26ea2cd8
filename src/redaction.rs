use once_cell::sync::Lazy;
use regex::Regex;

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)\b(api[_-]?key|key|token|id_?token|secret|password)\s*[:=]\s*["']?([A-Za-z0-9_\-\.]{6,})["']?"#)
            .expect("valid regex"),
        Regex::new(r"(?i)\b(bearer)\s+([A-Za-z0-9_\-\.=]{8,})").expect("valid regex"),
        Regex::new(r"\b(sk-[A-Za-z0-9_\-]{20,})\b").expect("valid regex"),
        Regex::new(r"\b(AIza[0-9A-Za-z_\-]{30,})\b").expect("valid regex"),
    ]
});

#[derive(Debug, Default, Clone, Copy)]
pub struct Redactor;

impl Redactor {
    pub fn new() -> Self {
        Self
    }

    pub fn redact(&self, input: &str) -> String {
        if input.is_empty() {
            return String::new();
        }

        let mut result = input.to_string();
        for pattern in SECRET_PATTERNS.iter() {
            if !pattern.is_match(&result) {
                continue;
            }
            result = pattern
                .replace_all(&result, |caps: &regex::Captures<'_>| match caps.get(2) {
                    Some(_) => {
                        let label = caps.get(1).map(|m| m.as_str()).unwrap_or("secret");
                        if label.eq_ignore_ascii_case("bearer") {
                            "Bearer [REDACTED]".to_string()
                        } else {
                            format!("{}=[REDACTED]", label.to_ascii_lowercase())
                        }
                    }
                    None => "[REDACTED]".to_string(),
                })
                .to_string();
        }
        result
    }
}
