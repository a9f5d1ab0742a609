use super::model::Snippet;

/// Words signalling the user wants analysis or debugging rather than a
/// ready-made routine. Kept as configuration: the literal patterns were
/// tuned to one natural language and are not classification logic.
#[derive(Clone, Debug, PartialEq)]
pub struct MatcherConfig {
    pub analysis_markers: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            analysis_markers: ["bozuk", "hata", "açıkla", "nedir", "kontrol", "analiz"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Finds at most one candidate snippet for a free-text request.
///
/// First match in collection order wins: contributed and imported items are
/// prepended to the collection, so they outrank older entries with
/// overlapping keywords. This order-dependence is a contract, not an
/// accident (see the tests).
pub fn search<'a>(
    library: &'a [Snippet],
    text: &str,
    config: &MatcherConfig,
) -> Option<&'a Snippet> {
    let lower = text.to_lowercase();

    // Analysis and debugging requests are never library hits.
    if config.analysis_markers.iter().any(|m| lower.contains(m)) {
        return None;
    }

    for item in library {
        if lower.contains(&item.title.to_lowercase()) {
            return Some(item);
        }
        if item
            .keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
        {
            return Some(item);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::Category;

    fn snippet(id: &str, title: &str, keywords: &[&str]) -> Snippet {
        Snippet {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            code: String::new(),
            category: Category::Other,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            author: None,
            downloads: None,
            likes: None,
        }
    }

    #[test]
    fn keyword_substring_matches() {
        let lib = vec![snippet("lay-del", "Layer Sil (LAYDEL)", &["layer", "sil"])];
        let config = MatcherConfig::default();
        let hit = search(&lib, "tüm layerları sil", &config);
        assert_eq!(hit.map(|s| s.id.as_str()), Some("lay-del"));
    }

    #[test]
    fn analysis_intent_disqualifies_the_search() {
        let lib = vec![snippet("lay-del", "Layer Sil (LAYDEL)", &["layer"])];
        let config = MatcherConfig::default();
        assert!(search(&lib, "layer silen kodum bozuk", &config).is_none());
        assert!(search(&lib, "layer komutu nedir", &config).is_none());
    }

    #[test]
    fn first_match_in_collection_order_wins() {
        let lib = vec![
            snippet("newer", "Yeni Metraj", &["uzunluk"]),
            snippet("older", "Toplam Uzunluk", &["uzunluk"]),
        ];
        let config = MatcherConfig::default();
        let hit = search(&lib, "uzunluk ölç", &config);
        assert_eq!(hit.map(|s| s.id.as_str()), Some("newer"));
    }

    #[test]
    fn no_match_returns_none() {
        let lib = vec![snippet("tlen", "Toplam Uzunluk (TLEN)", &["uzunluk"])];
        let config = MatcherConfig::default();
        assert!(search(&lib, "bana bir blok sayacı yaz", &config).is_none());
    }
}
