//! Pre-inference security gate
//!
//! Reads the mitigation action and threat score an upstream WAF attaches to the
//! request and decides whether the request may reach inference at all.

use crate::config::{ActionPolicy, SecurityConfig};
use hyper::HeaderMap;

/// Signals read from one request's headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecuritySignal {
    /// Present only when the upstream layer acted on the request
    pub mitigation_action: Option<String>,
    /// Absent when the header is missing or not an integer
    pub threat_score: Option<i64>,
}

/// Outcome of the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block { action: Option<String> },
}

/// Header-driven block policy, built once from configuration
#[derive(Debug, Clone)]
pub struct SecurityGate {
    mitigation_header: String,
    threat_score_header: String,
    threat_threshold: i64,
    action_policy: ActionPolicy,
}

impl SecurityGate {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            mitigation_header: config.mitigation_header.to_ascii_lowercase(),
            threat_score_header: config.threat_score_header.to_ascii_lowercase(),
            threat_threshold: config.threat_threshold,
            action_policy: config.action_policy.clone(),
        }
    }

    /// Extract the two signal values; never fails
    pub fn read_signal(&self, headers: &HeaderMap) -> SecuritySignal {
        SecuritySignal {
            mitigation_action: header_bytes(headers, &self.mitigation_header)
                .map(|v| String::from_utf8_lossy(v).into_owned()),
            threat_score: header_bytes(headers, &self.threat_score_header)
                .and_then(|v| std::str::from_utf8(v).ok())
                .and_then(|v| v.parse().ok()),
        }
    }

    pub fn evaluate(&self, signal: &SecuritySignal) -> Verdict {
        let action_triggered = signal
            .mitigation_action
            .as_deref()
            .is_some_and(|action| self.action_blocks(action));
        let score_triggered = signal
            .threat_score
            .is_some_and(|score| score >= self.threat_threshold);

        if action_triggered || score_triggered {
            Verdict::Block {
                action: signal.mitigation_action.clone(),
            }
        } else {
            Verdict::Allow
        }
    }

    fn action_blocks(&self, action: &str) -> bool {
        match &self.action_policy {
            ActionPolicy::AnyAction => !action.is_empty(),
            ActionPolicy::Listed { actions } => {
                actions.iter().any(|listed| listed.eq_ignore_ascii_case(action))
            }
        }
    }
}

/// Raw header bytes, trimmed; presence does not depend on the value being ASCII
fn header_bytes<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a [u8]> {
    headers
        .get(name)
        .map(|v| v.as_bytes().trim_ascii())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn gate(policy: ActionPolicy) -> SecurityGate {
        SecurityGate::new(&SecurityConfig {
            action_policy: policy,
            ..SecurityConfig::default()
        })
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn verdict(policy: ActionPolicy, pairs: &[(&'static str, &'static str)]) -> Verdict {
        let gate = gate(policy);
        gate.evaluate(&gate.read_signal(&headers(pairs)))
    }

    #[test]
    fn test_any_action_blocks() {
        for action in ["block", "challenge", "managed_challenge", "log"] {
            let mut map = HeaderMap::new();
            map.insert("cf-mitigated", HeaderValue::from_static(action));
            let gate = gate(ActionPolicy::AnyAction);
            assert_eq!(
                gate.evaluate(&gate.read_signal(&map)),
                Verdict::Block {
                    action: Some(action.to_string())
                }
            );
        }
    }

    #[test]
    fn test_high_score_blocks_without_action() {
        assert_eq!(
            verdict(ActionPolicy::AnyAction, &[("cf-threat-score", "90")]),
            Verdict::Block { action: None }
        );
        assert_eq!(
            verdict(ActionPolicy::AnyAction, &[("cf-threat-score", "100")]),
            Verdict::Block { action: None }
        );
    }

    #[test]
    fn test_clean_signals_allow() {
        assert_eq!(verdict(ActionPolicy::AnyAction, &[]), Verdict::Allow);
        assert_eq!(
            verdict(ActionPolicy::AnyAction, &[("cf-threat-score", "89")]),
            Verdict::Allow
        );
        assert_eq!(
            verdict(ActionPolicy::AnyAction, &[("cf-threat-score", "high")]),
            Verdict::Allow
        );
        assert_eq!(
            verdict(ActionPolicy::AnyAction, &[("cf-threat-score", "95.5")]),
            Verdict::Allow
        );
    }

    #[test]
    fn test_non_ascii_action_still_blocks() {
        let gate = gate(ActionPolicy::AnyAction);
        let mut map = HeaderMap::new();
        map.insert("cf-mitigated", HeaderValue::from_bytes(b"bl\xffck").unwrap());
        let signal = gate.read_signal(&map);
        assert_eq!(signal.mitigation_action.as_deref(), Some("bl\u{fffd}ck"));
        assert_eq!(
            gate.evaluate(&signal),
            Verdict::Block {
                action: Some("bl\u{fffd}ck".to_string())
            }
        );
    }

    #[test]
    fn test_empty_action_is_absent() {
        let gate = gate(ActionPolicy::AnyAction);
        let signal = gate.read_signal(&headers(&[("cf-mitigated", "  ")]));
        assert_eq!(signal, SecuritySignal::default());
        assert_eq!(gate.evaluate(&signal), Verdict::Allow);
    }

    #[test]
    fn test_listed_policy_only_blocks_listed_actions() {
        let listed = || ActionPolicy::Listed {
            actions: vec!["managed_challenge".to_string()],
        };
        assert_eq!(
            verdict(listed(), &[("cf-mitigated", "Managed_Challenge")]),
            Verdict::Block {
                action: Some("Managed_Challenge".to_string())
            }
        );
        assert_eq!(verdict(listed(), &[("cf-mitigated", "log")]), Verdict::Allow);
        // score still applies under the narrow policy, and echoes the action seen
        assert_eq!(
            verdict(listed(), &[("cf-mitigated", "log"), ("cf-threat-score", "97")]),
            Verdict::Block {
                action: Some("log".to_string())
            }
        );
    }

    #[test]
    fn test_custom_header_names_and_threshold() {
        let gate = SecurityGate::new(&SecurityConfig {
            mitigation_header: "X-WAF-Action".to_string(),
            threat_score_header: "X-WAF-Score".to_string(),
            threat_threshold: 50,
            ..SecurityConfig::default()
        });
        let signal = gate.read_signal(&headers(&[("x-waf-score", "50")]));
        assert_eq!(signal.threat_score, Some(50));
        assert_eq!(gate.evaluate(&signal), Verdict::Block { action: None });
        // default header names are no longer consulted
        let signal = gate.read_signal(&headers(&[("cf-mitigated", "block")]));
        assert_eq!(gate.evaluate(&signal), Verdict::Allow);
    }
}
