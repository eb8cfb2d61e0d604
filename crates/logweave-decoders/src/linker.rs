use logweave_types::JoinKey;
use std::collections::{HashMap, HashSet};

/// Resolution of one tool outcome against the invocations seen so far.
#[derive(Debug, Clone)]
pub struct OutcomeLink {
    pub key: JoinKey,
    /// True when the key matched no known invocation. Orphaned outcomes are
    /// still emitted; pairing is advisory for downstream grouping.
    pub orphaned: bool,
}

/// Reference material available when resolving an outcome's join key,
/// in priority order: explicit reference, then a metadata-level "linked to"
/// reference, then best-effort name matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeRef<'a> {
    pub reference: Option<&'a str>,
    pub metadata_reference: Option<&'a str>,
    pub tool_name: Option<&'a str>,
    pub parent_id: &'a str,
}

/// Assigns and resolves join keys between tool invocations and outcomes.
///
/// Holds per-parse state only: occurrence counters and the set of pending
/// invocations. One linker per decode call; never shared across parses.
#[derive(Debug, Default)]
pub struct ToolLinker {
    known: HashSet<JoinKey>,
    /// Invocations not yet claimed by an outcome, in emission order.
    unresolved: Vec<(JoinKey, String)>,
    /// (parent record id, tool name) -> prior same-named invocations.
    occurrence: HashMap<(String, String), usize>,
}

impl ToolLinker {
    pub fn new() -> Self {
        ToolLinker::default()
    }

    /// Key for a tool invocation: the native call id verbatim when the
    /// source supplies one, otherwise a synthetic key unique across repeated
    /// same-named calls within one parent record.
    pub fn invocation_key(
        &mut self,
        parent_id: &str,
        tool_name: &str,
        native_id: Option<&str>,
    ) -> JoinKey {
        let key = match native_id {
            Some(id) if !id.is_empty() => JoinKey::native(id),
            _ => {
                let count = self
                    .occurrence
                    .entry((parent_id.to_string(), tool_name.to_string()))
                    .or_insert(0);
                let key = JoinKey::synthetic(parent_id, tool_name, *count);
                *count += 1;
                key
            }
        };
        self.known.insert(key.clone());
        self.unresolved.push((key.clone(), tool_name.to_string()));
        key
    }

    /// Resolve an outcome's key. Unmatched outcomes get a deterministic
    /// standalone key and `orphaned: true`; they are never silently
    /// mismatched to an unrelated invocation.
    pub fn outcome_key(&mut self, outcome: OutcomeRef<'_>) -> OutcomeLink {
        if let Some(id) = outcome
            .reference
            .or(outcome.metadata_reference)
            .filter(|id| !id.is_empty())
        {
            let key = JoinKey::native(id);
            let orphaned = !self.known.contains(&key);
            if !orphaned {
                self.unresolved.retain(|(k, _)| k != &key);
            }
            return OutcomeLink { key, orphaned };
        }

        // No reference at all: claim the most recent unresolved invocation,
        // name-matched when the outcome knows its tool name.
        let position = match outcome.tool_name {
            Some(name) => self.unresolved.iter().rposition(|(_, n)| n == name),
            None => self.unresolved.len().checked_sub(1),
        };
        if let Some(position) = position {
            let (key, _) = self.unresolved.remove(position);
            return OutcomeLink {
                key,
                orphaned: false,
            };
        }

        let name = outcome.tool_name.unwrap_or("tool");
        let count = self
            .occurrence
            .entry((outcome.parent_id.to_string(), name.to_string()))
            .or_insert(0);
        let key = JoinKey::synthetic(outcome.parent_id, name, *count);
        *count += 1;
        OutcomeLink {
            key,
            orphaned: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_ids_pass_through() {
        let mut linker = ToolLinker::new();
        let key = linker.invocation_key("m1", "bash", Some("call_42"));
        assert_eq!(key.as_str(), "call_42");

        let link = linker.outcome_key(OutcomeRef {
            reference: Some("call_42"),
            parent_id: "m2",
            ..Default::default()
        });
        assert_eq!(link.key.as_str(), "call_42");
        assert!(!link.orphaned);
    }

    #[test]
    fn repeated_same_named_calls_get_distinct_keys() {
        let mut linker = ToolLinker::new();
        let first = linker.invocation_key("m1", "bash", None);
        let second = linker.invocation_key("m1", "bash", None);
        assert_eq!(first.as_str(), "m1:bash:0");
        assert_eq!(second.as_str(), "m1:bash:1");
    }

    #[test]
    fn explicit_reference_outranks_metadata_reference() {
        let mut linker = ToolLinker::new();
        let _a = linker.invocation_key("m1", "bash", Some("call_a"));
        let _b = linker.invocation_key("m1", "bash", Some("call_b"));

        let link = linker.outcome_key(OutcomeRef {
            reference: Some("call_a"),
            metadata_reference: Some("call_b"),
            parent_id: "m2",
            ..Default::default()
        });
        assert_eq!(link.key.as_str(), "call_a");
    }

    #[test]
    fn metadata_reference_resolves_when_no_explicit_reference_exists() {
        let mut linker = ToolLinker::new();
        let _key = linker.invocation_key("m1", "edit", Some("tu-7"));

        let link = linker.outcome_key(OutcomeRef {
            metadata_reference: Some("tu-7"),
            parent_id: "m2",
            ..Default::default()
        });
        assert_eq!(link.key.as_str(), "tu-7");
        assert!(!link.orphaned);
    }

    #[test]
    fn unreferenced_outcome_claims_most_recent_matching_invocation() {
        let mut linker = ToolLinker::new();
        let _read = linker.invocation_key("m1", "read_file", None);
        let exec = linker.invocation_key("m1", "execute_command", None);

        let link = linker.outcome_key(OutcomeRef {
            tool_name: Some("execute_command"),
            parent_id: "m2",
            ..Default::default()
        });
        assert_eq!(link.key, exec);
        assert!(!link.orphaned);
    }

    #[test]
    fn unmatched_reference_is_orphaned_not_dropped() {
        let mut linker = ToolLinker::new();
        let link = linker.outcome_key(OutcomeRef {
            reference: Some("call_never_seen"),
            parent_id: "m1",
            ..Default::default()
        });
        assert!(link.orphaned);
        assert_eq!(link.key.as_str(), "call_never_seen");
    }

    #[test]
    fn outcome_without_any_candidates_gets_deterministic_orphan_key() {
        let mut linker = ToolLinker::new();
        let link = linker.outcome_key(OutcomeRef {
            parent_id: "m1",
            ..Default::default()
        });
        assert!(link.orphaned);
        assert_eq!(link.key.as_str(), "m1:tool:0");
    }

    #[test]
    fn resolved_invocation_is_not_claimed_twice() {
        let mut linker = ToolLinker::new();
        let _key = linker.invocation_key("m1", "bash", None);

        let first = linker.outcome_key(OutcomeRef {
            tool_name: Some("bash"),
            parent_id: "m2",
            ..Default::default()
        });
        assert!(!first.orphaned);

        let second = linker.outcome_key(OutcomeRef {
            tool_name: Some("bash"),
            parent_id: "m3",
            ..Default::default()
        });
        assert!(second.orphaned);
    }
}
