use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::library::matcher::{self, MatcherConfig};
use crate::library::model::Snippet;
use crate::security::SecurityGate;
use crate::services::gemini::RequestMode;

lazy_static! {
    /// Structural fingerprint of pasted AutoLISP: an opening delimiter at
    /// the start or one of the language's defining tokens.
    static ref CODE_SHAPE: Regex = Regex::new(r"(?i)^\s*\(|defun|setq|vl-|command|entmake").unwrap();
}

/// Intent keyword lists. The literal patterns mirror the product's tuned
/// heuristics for one natural language; they are configuration, not logic,
/// and classification quality is not a goal beyond preserving them.
#[derive(Clone, Debug, PartialEq)]
pub struct RouterConfig {
    /// Single words that alone signal a library-wide integrity scan.
    pub diagnostics_words: Vec<String>,
    /// Word pairs that must both be present to signal the scan.
    pub diagnostics_pairs: Vec<(String, String)>,
    /// Words that turn a pasted-code submission into an explain request.
    pub explain_markers: Vec<String>,
    pub matcher: MatcherConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let words = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            diagnostics_words: words(&["sistem taraması", "teşhis", "check"]),
            diagnostics_pairs: vec![
                ("tüm".to_string(), "kontrol".to_string()),
                ("kütüphane".to_string(), "analiz".to_string()),
                ("lisp".to_string(), "analiz".to_string()),
            ],
            explain_markers: words(&["açıkla", "anlat", "nedir", "analiz"]),
            matcher: MatcherConfig::default(),
        }
    }
}

/// One handling path for a submission, selected in fixed priority order.
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    /// Locked session or a request already in flight: the input is dropped
    /// without appending anything to the conversation.
    Dropped,
    /// Submission arrived inside the cooldown window.
    RateLimited,
    /// Local pre-filter rejected the input outright.
    Rejected(String),
    /// Deterministic library scan, never forwarded to the remote model.
    Diagnostics,
    /// Pasted code routed to repair/review or line-by-line explanation.
    Code { mode: RequestMode, code: String },
    /// An existing snippet intercepts the request; awaits a user decision.
    Proposal {
        snippet: Snippet,
        original_request: String,
    },
    /// Falls through to the remote generation call.
    Generate { prompt: String },
}

pub struct RequestRouter {
    pub config: RouterConfig,
}

impl RequestRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Classifies a raw submission. Transitions are evaluated in this fixed
    /// order: lockout/in-flight guard, rate limit, input screen, code
    /// detection, diagnostics intent, library interception, plain generation.
    /// Code detection comes before intent keywords so a pasted routine whose
    /// command name happens to contain one is still treated as code.
    ///
    /// The rate-limit window is consumed here; callers must not re-check it.
    pub fn classify(
        &self,
        input: &str,
        library: &[Snippet],
        gate: &mut SecurityGate,
        in_flight: bool,
        force_custom: bool,
        has_attachments: bool,
        now: DateTime<Utc>,
    ) -> Route {
        if gate.is_locked() || in_flight {
            tracing::warn!(locked = gate.is_locked(), in_flight, "submission dropped");
            return Route::Dropped;
        }

        if gate.check_rate_limit(now).is_err() {
            return Route::RateLimited;
        }

        if let Err(e) = gate.screen_input(input) {
            let was_violation = e.is_violation();
            if was_violation {
                gate.record_outcome(true);
            }
            return Route::Rejected(e.to_string());
        }

        let lower = input.to_lowercase();

        if !force_custom && Self::looks_like_code(input) {
            let mode = if self.config.explain_markers.iter().any(|m| lower.contains(m)) {
                RequestMode::Explain
            } else {
                RequestMode::Optimize
            };
            return Route::Code {
                mode,
                code: input.to_string(),
            };
        }

        if !force_custom && !has_attachments && self.is_diagnostics_intent(&lower) {
            return Route::Diagnostics;
        }

        if !force_custom && !has_attachments {
            if let Some(hit) = matcher::search(library, input, &self.config.matcher) {
                return Route::Proposal {
                    snippet: hit.clone(),
                    original_request: input.to_string(),
                };
            }
        }

        Route::Generate {
            prompt: input.to_string(),
        }
    }

    fn is_diagnostics_intent(&self, lower: &str) -> bool {
        self.config.diagnostics_words.iter().any(|w| lower.contains(w))
            || self
                .config
                .diagnostics_pairs
                .iter()
                .any(|(a, b)| lower.contains(a) && lower.contains(b))
    }

    /// A submission counts as pasted code when it carries the structural
    /// shape of the language and a balancing closing delimiter.
    fn looks_like_code(input: &str) -> bool {
        CODE_SHAPE.is_match(input) && input.contains(')')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::Category;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn library_with_layer_tool() -> Vec<Snippet> {
        vec![Snippet {
            id: "lay-del".to_string(),
            title: "Layer Sil (LAYDEL)".to_string(),
            description: String::new(),
            code: "(defun c:LAYDELFORCE () (princ))".to_string(),
            category: Category::Layers,
            keywords: vec!["layer".to_string(), "sil".to_string()],
            author: None,
            downloads: None,
            likes: None,
        }]
    }

    fn classify(router: &RequestRouter, gate: &mut SecurityGate, input: &str, ms: i64) -> Route {
        router.classify(input, &library_with_layer_tool(), gate, false, false, false, at(ms))
    }

    #[test]
    fn locked_or_in_flight_drops_without_rate_limit_consumption() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let route = router.classify("merhaba", &[], &mut gate, true, false, false, at(10_000));
        assert_eq!(route, Route::Dropped);
        // The in-flight drop did not consume the rate window.
        assert!(gate.check_rate_limit(at(10_001)).is_ok());
    }

    #[test]
    fn rapid_second_submission_never_reaches_classification() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        assert!(matches!(
            classify(&router, &mut gate, "tüm layerları sil", 10_000),
            Route::Proposal { .. }
        ));
        assert_eq!(
            classify(&router, &mut gate, "tüm layerları sil", 11_000),
            Route::RateLimited
        );
    }

    #[test]
    fn matching_request_produces_a_proposal_not_a_remote_call() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        match classify(&router, &mut gate, "tüm layerları sil", 10_000) {
            Route::Proposal { snippet, original_request } => {
                assert_eq!(snippet.id, "lay-del");
                assert_eq!(original_request, "tüm layerları sil");
            }
            other => panic!("expected proposal, got {other:?}"),
        }
    }

    #[test]
    fn force_custom_bypasses_the_library() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let route = router.classify(
            "tüm layerları sil",
            &library_with_layer_tool(),
            &mut gate,
            false,
            true,
            false,
            at(10_000),
        );
        assert!(matches!(route, Route::Generate { .. }));
    }

    #[test]
    fn pasted_routine_routes_to_optimize_with_code_context() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let input = "(defun c:TEST () (princ))";
        match classify(&router, &mut gate, input, 10_000) {
            Route::Code { mode, code } => {
                assert_eq!(mode, RequestMode::Optimize);
                assert_eq!(code, input);
            }
            other => panic!("expected code route, got {other:?}"),
        }
    }

    #[test]
    fn pasted_code_with_explain_intent_routes_to_explain() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let input = "şu kodu açıkla (defun c:TEST () (princ))";
        match classify(&router, &mut gate, input, 10_000) {
            Route::Code { mode, .. } => assert_eq!(mode, RequestMode::Explain),
            other => panic!("expected code route, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_fragment_is_not_code() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        // Mentions a token but carries no closing delimiter.
        let route = classify(&router, &mut gate, "defun nasıl kullanılır", 10_000);
        assert!(!matches!(route, Route::Code { .. }));
    }

    #[test]
    fn diagnostics_intent_short_circuits_before_the_library() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        assert_eq!(
            classify(&router, &mut gate, "kütüphane analiz et", 10_000),
            Route::Diagnostics
        );
        assert_eq!(
            classify(&router, &mut gate, "tüm lispleri kontrol et", 12_000),
            Route::Diagnostics
        );
    }

    #[test]
    fn pasted_routine_named_like_a_scan_keyword_stays_code() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        // "check" is also a scan keyword; the structural shape wins.
        let input = "(defun c:CHECK () (princ))";
        match classify(&router, &mut gate, input, 10_000) {
            Route::Code { mode, code } => {
                assert_eq!(mode, RequestMode::Optimize);
                assert_eq!(code, input);
            }
            other => panic!("expected code route, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_request_falls_through_to_generation() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let route = classify(&router, &mut gate, "bana bir blok sayacı yaz", 10_000);
        assert_eq!(
            route,
            Route::Generate {
                prompt: "bana bir blok sayacı yaz".to_string()
            }
        );
    }

    #[test]
    fn script_markers_are_rejected_and_counted() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let route = classify(&router, &mut gate, "<script>alert(1)</script>", 10_000);
        assert!(matches!(route, Route::Rejected(_)));
        assert_eq!(gate.violation_count(), 1);
    }

    #[test]
    fn forced_replay_still_screens_input() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let route = router.classify(
            "<script>alert(1)</script>",
            &[],
            &mut gate,
            false,
            true,
            false,
            at(10_000),
        );
        assert!(matches!(route, Route::Rejected(_)));
        assert_eq!(gate.violation_count(), 1);
    }

    #[test]
    fn locked_gate_drops_everything() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        for _ in 0..3 {
            gate.record_outcome(true);
        }
        assert_eq!(
            classify(&router, &mut gate, "toplam uzunluk", 10_000),
            Route::Dropped
        );
    }
}
