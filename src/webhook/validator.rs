//! Webhook validation: shape check, mode gate, remote confirmation.
//!
//! Cheap local checks run first; only a notification that already looks
//! plausible generates provider traffic. Forged or misrouted requests are
//! rejected without a single outbound call.

use crate::config::Mode;
use crate::error::RejectReason;
use crate::webhook::event::{Notification, VerifiedEvent, TEST_EVENT_ID};
use crate::webhook::verifier::EventVerifier;

/// Whether the notification may proceed to the remote lookup.
///
/// Live events pass only in live mode and sandbox events only in test mode;
/// the dashboard test id passes in either.
fn gate_passes(mode: Mode, id: &str, livemode: bool) -> bool {
    (mode == Mode::Live && livemode)
        || (mode == Mode::Test && !livemode)
        || id == TEST_EVENT_ID
}

/// Validate a decoded notification against the current mode.
///
/// Returns the provider's own record of the event, never the caller-supplied
/// body. Exactly one remote call is made, and only after the local gate
/// passes; remote failures propagate without retry.
pub async fn validate(
    mode: Mode,
    notification: &Notification,
    verifier: &dyn EventVerifier,
) -> Result<VerifiedEvent, RejectReason> {
    let id = notification.event_id().ok_or(RejectReason::MissingId)?;

    if !gate_passes(mode, id, notification.livemode) {
        return Err(RejectReason::ModeMismatch {
            mode,
            livemode: notification.livemode,
        });
    }

    Ok(verifier.retrieve(id).await?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::error::VerifyError;
    use crate::webhook::event::EventData;

    /// Verifier that answers from a fixed table and counts lookups.
    struct ScriptedVerifier {
        events: HashMap<String, VerifiedEvent>,
        calls: AtomicU32,
    }

    impl ScriptedVerifier {
        fn knowing(ids: &[(&str, bool)]) -> Self {
            let events = ids
                .iter()
                .map(|(id, livemode)| ((*id).to_string(), test_event(id, *livemode)))
                .collect();
            Self {
                events,
                calls: AtomicU32::new(0),
            }
        }

        fn empty() -> Self {
            Self::knowing(&[])
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventVerifier for ScriptedVerifier {
        async fn retrieve(&self, id: &str) -> Result<VerifiedEvent, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.events
                .get(id)
                .cloned()
                .ok_or_else(|| VerifyError::UnknownEvent(id.to_string()))
        }
    }

    fn test_event(id: &str, livemode: bool) -> VerifiedEvent {
        VerifiedEvent {
            id: id.to_string(),
            event_type: "charge.succeeded".to_string(),
            created: 1614556800,
            api_version: None,
            livemode,
            pending_webhooks: 1,
            data: EventData {
                object: json!({"id": "ch_1"}),
                previous_attributes: None,
            },
            request: None,
        }
    }

    fn notification(id: Option<&str>, livemode: bool) -> Notification {
        Notification {
            id: id.map(str::to_string),
            livemode,
            event_type: "charge.succeeded".to_string(),
            data: json!({"object": {"id": "ch_1"}}),
        }
    }

    #[tokio::test]
    async fn test_missing_id_rejected_without_lookup() {
        let verifier = ScriptedVerifier::knowing(&[("evt_1", false)]);
        let result = validate(Mode::Test, &notification(None, false), &verifier).await;

        assert!(matches!(result, Err(RejectReason::MissingId)));
        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_id_rejected_without_lookup() {
        let verifier = ScriptedVerifier::knowing(&[("evt_1", false)]);
        let result = validate(Mode::Test, &notification(Some(""), false), &verifier).await;

        assert!(matches!(result, Err(RejectReason::MissingId)));
        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_matching_modes_pass_the_gate() {
        let verifier = ScriptedVerifier::knowing(&[("evt_live", true), ("evt_test", false)]);

        let event = validate(Mode::Live, &notification(Some("evt_live"), true), &verifier)
            .await
            .unwrap();
        assert_eq!(event.id, "evt_live");

        let event = validate(Mode::Test, &notification(Some("evt_test"), false), &verifier)
            .await
            .unwrap();
        assert_eq!(event.id, "evt_test");

        assert_eq!(verifier.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mode_mismatch_rejected_without_lookup() {
        let verifier = ScriptedVerifier::knowing(&[("evt_1", false)]);

        let result = validate(Mode::Live, &notification(Some("evt_1"), false), &verifier).await;
        assert!(matches!(
            result,
            Err(RejectReason::ModeMismatch {
                mode: Mode::Live,
                livemode: false
            })
        ));

        let result = validate(Mode::Test, &notification(Some("evt_1"), true), &verifier).await;
        assert!(matches!(
            result,
            Err(RejectReason::ModeMismatch {
                mode: Mode::Test,
                livemode: true
            })
        ));

        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dashboard_test_id_bypasses_the_gate() {
        let verifier = ScriptedVerifier::knowing(&[(TEST_EVENT_ID, true)]);

        // livemode=true in test mode would normally be a mismatch
        let event = validate(
            Mode::Test,
            &notification(Some(TEST_EVENT_ID), true),
            &verifier,
        )
        .await
        .unwrap();

        assert_eq!(event.id, TEST_EVENT_ID);
        assert_eq!(verifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_test_id_still_needs_the_lookup() {
        let verifier = ScriptedVerifier::empty();

        let result = validate(
            Mode::Test,
            &notification(Some(TEST_EVENT_ID), true),
            &verifier,
        )
        .await;

        assert!(matches!(
            result,
            Err(RejectReason::Verification(VerifyError::UnknownEvent(_)))
        ));
        assert_eq!(verifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_propagates_without_retry() {
        let verifier = ScriptedVerifier::empty();

        let result = validate(Mode::Test, &notification(Some("evt_gone"), false), &verifier).await;

        match result {
            Err(RejectReason::Verification(VerifyError::UnknownEvent(id))) => {
                assert_eq!(id, "evt_gone");
            }
            other => panic!("expected verification failure, got {other:?}"),
        }
        assert_eq!(verifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_validation_is_repeatable() {
        let verifier = ScriptedVerifier::knowing(&[("evt_1", false)]);
        let n = notification(Some("evt_1"), false);

        let first = validate(Mode::Test, &n, &verifier).await.unwrap();
        let second = validate(Mode::Test, &n, &verifier).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(verifier.call_count(), 2);
    }

    proptest! {
        // The gate decision is a pure function of (mode, id, livemode) and
        // matches the truth table exactly.
        #[test]
        fn prop_gate_truth_table(
            live_mode in any::<bool>(),
            livemode in any::<bool>(),
            id in "[a-z0-9_]{1,24}",
        ) {
            let mode = if live_mode { Mode::Live } else { Mode::Test };
            let expected = (mode == Mode::Live && livemode)
                || (mode == Mode::Test && !livemode)
                || id == TEST_EVENT_ID;

            prop_assert_eq!(gate_passes(mode, &id, livemode), expected);
            // Deterministic: same inputs, same answer
            prop_assert_eq!(gate_passes(mode, &id, livemode), gate_passes(mode, &id, livemode));
        }

        #[test]
        fn prop_sentinel_always_passes(live_mode in any::<bool>(), livemode in any::<bool>()) {
            let mode = if live_mode { Mode::Live } else { Mode::Test };
            prop_assert!(gate_passes(mode, TEST_EVENT_ID, livemode));
        }
    }
}
