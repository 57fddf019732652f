/// Keywords scanned for when writing the insight line of a report entry.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "AI",
    "edge",
    "platform",
    "cloud",
    "security",
    "tool",
    "automation",
    "agent",
];

const FALLBACK_INSIGHT: &str =
    "향후 Tizen AI-OS와 연동 가능한 기술적 힌트는 키워드 기반으로 추가 분석이 필요합니다.";

/// Keywords that occur in the title or summary, case-insensitively.
///
/// Matching is plain substring containment. Results follow `keywords` order
/// and each keyword appears at most once.
pub fn matched_keywords<'k>(title: &str, summary: &str, keywords: &'k [String]) -> Vec<&'k str> {
    let title = title.to_lowercase();
    let summary = summary.to_lowercase();

    let mut matched: Vec<&str> = Vec::new();
    for keyword in keywords {
        let needle = keyword.to_lowercase();
        if needle.is_empty() || matched.contains(&keyword.as_str()) {
            continue;
        }
        if title.contains(&needle) || summary.contains(&needle) {
            matched.push(keyword);
        }
    }
    matched
}

/// One-sentence insight for an entry.
///
/// Deterministic: the same title, summary and keyword list always give the
/// same sentence.
pub fn insight_sentence(title: &str, summary: &str, keywords: &[String]) -> String {
    let matched = matched_keywords(title, summary, keywords);
    if matched.is_empty() {
        return FALLBACK_INSIGHT.to_string();
    }
    format!(
        "핵심 키워드: {}를 중심으로 적용 가능한 기술 트렌드를 추출합니다.",
        matched.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_keywords_follow_list_order() {
        let keywords = keywords();
        let matched = matched_keywords(
            "Security tooling for the cloud",
            "An open platform",
            &keywords,
        );
        assert_eq!(matched, vec!["platform", "cloud", "security", "tool"]);
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        // "ai" inside "maintain" counts, as does "AGENT" for "agent"
        let keywords = keywords();
        let matched = matched_keywords("How we maintain things", "AGENTS everywhere", &keywords);
        assert_eq!(matched, vec!["AI", "agent"]);
    }

    #[test]
    fn test_duplicate_keywords_reported_once() {
        let keywords = vec!["edge".to_string(), "Edge".to_string(), "edge".to_string()];
        assert_eq!(matched_keywords("edge computing", "", &keywords), vec!["edge", "Edge"]);
    }

    #[test]
    fn test_sentence_with_keywords() {
        assert_eq!(
            insight_sentence("Edge AI chips", "", &keywords()),
            "핵심 키워드: AI, edge를 중심으로 적용 가능한 기술 트렌드를 추출합니다."
        );
    }

    #[test]
    fn test_sentence_fallback() {
        assert_eq!(
            insight_sentence("Gardening tips", "Tomatoes and basil", &keywords()),
            FALLBACK_INSIGHT
        );
        assert_eq!(insight_sentence("Edge AI", "", &[]), FALLBACK_INSIGHT);
    }
}
