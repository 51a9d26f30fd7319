//! Heuristic intent classifier
//!
//! Pattern/keyword scorer over the raw query text. No I/O, no model
//! calls; always produces a ranked candidate list, so it doubles as the
//! fallback path when the AI classifier is unavailable.

use crate::agent::AgentType;
use regex::Regex;

/// Baseline confidence for plain chat when nothing else matches
const CHAT_BASELINE: f32 = 0.15;

/// Weight added when the query contains a URL-shaped substring
const URL_WEIGHT: f32 = 0.8;

/// Weight added when the query contains a fenced code block
const CODE_FENCE_WEIGHT: f32 = 0.6;

/// Question openers that lean toward a live web lookup
const QUESTION_WORDS: &[&str] = &["what", "who", "when", "where", "why", "how"];

const WEB_SEARCH_MARKERS: &[(&str, f32)] = &[
    ("latest", 0.4),
    ("current", 0.35),
    ("today", 0.35),
    ("now", 0.25),
    ("news", 0.4),
    ("weather", 0.5),
    ("price", 0.4),
    ("stock", 0.4),
    ("recent", 0.35),
    ("breaking", 0.45),
    ("search", 0.45),
    ("look up", 0.5),
];

const URL_PULL_MARKERS: &[(&str, f32)] = &[
    ("this link", 0.5),
    ("this url", 0.5),
    ("this page", 0.4),
    ("summarize the link", 0.6),
    ("open the link", 0.5),
];

const CODE_MARKERS: &[(&str, f32)] = &[
    ("code", 0.3),
    ("python", 0.4),
    ("script", 0.35),
    ("function", 0.3),
    ("calculate", 0.4),
    ("compute", 0.4),
    ("plot", 0.4),
    ("chart", 0.3),
    ("dataframe", 0.5),
    ("regex", 0.4),
    ("debug", 0.4),
    ("run this", 0.5),
];

const LOCAL_KNOWLEDGE_MARKERS: &[(&str, f32)] = &[
    ("my document", 0.5),
    ("my file", 0.5),
    ("my notes", 0.5),
    ("uploaded", 0.4),
    ("knowledge base", 0.5),
    ("the document", 0.35),
    ("the pdf", 0.4),
    ("attachment", 0.4),
];

const TRANSLATION_MARKERS: &[(&str, f32)] = &[
    ("translate", 0.6),
    ("translation", 0.5),
    ("how do you say", 0.55),
];

/// Language names recognized as translation targets ("in french", "to korean")
const LANGUAGES: &[&str] = &[
    "english", "spanish", "french", "german", "italian", "portuguese", "japanese", "korean",
    "chinese", "russian", "arabic", "hindi",
];

const CHAT_MARKERS: &[(&str, f32)] = &[
    ("hello", 0.35),
    ("hi", 0.3),
    ("hey", 0.3),
    ("thanks", 0.3),
    ("thank you", 0.3),
    ("joke", 0.4),
    ("how are you", 0.5),
];

/// Pattern/keyword-based intent classifier
pub struct HeuristicClassifier {
    url_re: Regex,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicClassifier {
    /// Create a new classifier
    #[must_use]
    pub fn new() -> Self {
        Self {
            url_re: Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+\.\S+").expect("url regex"),
        }
    }

    /// Score the query against every agent type.
    ///
    /// Returns candidates ranked descending by confidence; ties are broken
    /// by the fixed agent priority order. The list always contains at
    /// least `StandardChat`, so classification cannot come back empty.
    #[must_use]
    pub fn classify(&self, query: &str) -> Vec<(AgentType, f32)> {
        let lower = query.to_lowercase();

        let mut web_search = score_markers(&lower, WEB_SEARCH_MARKERS);
        for word in QUESTION_WORDS {
            if contains_word(&lower, word) {
                web_search += 0.2;
                break;
            }
        }

        let mut url_pull = score_markers(&lower, URL_PULL_MARKERS);
        if self.url_re.is_match(query) {
            url_pull += URL_WEIGHT;
        }

        let mut code = score_markers(&lower, CODE_MARKERS);
        if query.contains("```") {
            code += CODE_FENCE_WEIGHT;
        }

        let local_knowledge = score_markers(&lower, LOCAL_KNOWLEDGE_MARKERS);

        let mut translation = score_markers(&lower, TRANSLATION_MARKERS);
        for lang in LANGUAGES {
            if contains_word(&lower, &format!("in {lang}"))
                || contains_word(&lower, &format!("to {lang}"))
            {
                translation += 0.25;
                break;
            }
        }

        let chat = CHAT_BASELINE + score_markers(&lower, CHAT_MARKERS);

        let mut candidates = vec![
            (AgentType::WebSearch, web_search.min(1.0)),
            (AgentType::UrlPull, url_pull.min(1.0)),
            (AgentType::CodeInterpreter, code.min(1.0)),
            (AgentType::LocalKnowledge, local_knowledge.min(1.0)),
            (AgentType::Translation, translation.min(1.0)),
            (AgentType::StandardChat, chat.min(1.0)),
        ];

        candidates.retain(|(agent, score)| *score > 0.0 || *agent == AgentType::StandardChat);
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.heuristic_priority().cmp(&b.0.heuristic_priority()))
        });

        candidates
    }
}

/// Sum the weights of every marker present in the query.
fn score_markers(lower: &str, markers: &[(&str, f32)]) -> f32 {
    markers
        .iter()
        .filter(|(marker, _)| contains_word(lower, marker))
        .map(|(_, weight)| weight)
        .sum()
}

/// Substring match bounded by non-alphanumeric characters, so "now" does
/// not fire inside "know".
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            return true;
        }
        from = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(query: &str) -> (AgentType, f32) {
        HeuristicClassifier::new().classify(query)[0]
    }

    #[test]
    fn test_weather_query_routes_to_web_search() {
        let (agent, confidence) = top("What's the weather in Paris?");
        assert_eq!(agent, AgentType::WebSearch);
        assert!(confidence > 0.0);
    }

    #[test]
    fn test_url_routes_to_url_pull() {
        let (agent, _) = top("Summarize https://example.com/article for me");
        assert_eq!(agent, AgentType::UrlPull);
    }

    #[test]
    fn test_code_fence_routes_to_code_interpreter() {
        let (agent, _) = top("Fix this:\n```\nfn main() {}\n```");
        assert_eq!(agent, AgentType::CodeInterpreter);
    }

    #[test]
    fn test_document_reference_routes_to_local_knowledge() {
        let (agent, _) = top("Summarize my document about Q3 planning");
        assert_eq!(agent, AgentType::LocalKnowledge);
    }

    #[test]
    fn test_translation_request() {
        let (agent, _) = top("Translate this sentence to french please");
        assert_eq!(agent, AgentType::Translation);
    }

    #[test]
    fn test_plain_chat_fallback() {
        let (agent, confidence) = top("ok sounds good");
        assert_eq!(agent, AgentType::StandardChat);
        assert!(confidence > 0.0 && confidence < 0.5);
    }

    #[test]
    fn test_empty_query_still_returns_chat() {
        let ranked = HeuristicClassifier::new().classify("");
        assert!(!ranked.is_empty());
        assert_eq!(ranked[0].0, AgentType::StandardChat);
    }

    #[test]
    fn test_word_boundaries() {
        assert!(contains_word("the weather now", "now"));
        assert!(!contains_word("i know this", "now"));
        assert!(!contains_word("encode it", "code"));
    }

    #[test]
    fn test_deterministic() {
        let classifier = HeuristicClassifier::new();
        let a = classifier.classify("latest news on rust");
        let b = classifier.classify("latest news on rust");
        assert_eq!(a, b);
    }

    #[test]
    fn test_scores_within_unit_interval() {
        let ranked = HeuristicClassifier::new()
            .classify("search the latest breaking news today about stock price now");
        for (_, score) in ranked {
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
