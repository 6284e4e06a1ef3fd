//! Unit tests for mv-host.

use mv_core::{CorrelationId, MovementConfig, Point2, Tick};

use crate::{
    HostEndpoint, LoopbackChannel, PathCall, PathFailure, PathService, PathfindingCoordinator,
    PendingRequest, loopback,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn config(timeout: u64) -> MovementConfig {
    MovementConfig {
        path_timeout_ticks: timeout,
        arrival_tolerance:  0.1,
        ..Default::default()
    }
}

fn coordinator(timeout: u64) -> (PathfindingCoordinator<LoopbackChannel>, HostEndpoint) {
    let (chan, host) = loopback();
    (PathfindingCoordinator::new(chan, &config(timeout)), host)
}

fn p(x: f32, y: f32) -> Point2 {
    Point2::new(x, y)
}

fn in_flight(call: PathCall) -> PendingRequest {
    match call {
        PathCall::InFlight(req) => req,
        other => panic!("expected InFlight, got {other:?}"),
    }
}

// ── Protocol ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod protocol {
    use crate::protocol::{DecodedResponse, RequestFrame, ResponseFrame, decode_response};

    use super::*;

    #[test]
    fn request_wire_shape() {
        let frame = RequestFrame::find_path(CorrelationId(3), p(0.0, 1.0), p(10.0, -2.5));
        let json: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "find-path");
        assert_eq!(json["from"], serde_json::json!([0.0, 1.0]));
        assert_eq!(json["to"], serde_json::json!([10.0, -2.5]));
    }

    #[test]
    fn request_decodes_from_peer_text() {
        let raw = r#"{"type":"find-path","id":9,"from":[1,2],"to":[3,4]}"#;
        let frame = RequestFrame::decode(raw).unwrap();
        assert_eq!(frame, RequestFrame::find_path(CorrelationId(9), p(1.0, 2.0), p(3.0, 4.0)));
    }

    #[test]
    fn response_with_path() {
        let raw = ResponseFrame { id: CorrelationId(4), path: Some(vec![p(5.0, 0.0), p(10.0, 0.0)]) }
            .encode()
            .unwrap();
        assert_eq!(
            decode_response(&raw).unwrap(),
            DecodedResponse::Path { id: CorrelationId(4), waypoints: vec![p(5.0, 0.0), p(10.0, 0.0)] }
        );
    }

    #[test]
    fn null_path_means_no_path() {
        let decoded = decode_response(r#"{"id": 4, "path": null}"#).unwrap();
        assert_eq!(decoded, DecodedResponse::NoPath { id: CorrelationId(4) });
    }

    #[test]
    fn damaged_body_keeps_id() {
        for raw in [
            r#"{"id": 4}"#,
            r#"{"id": 4, "path": "north"}"#,
            r#"{"id": 4, "path": [[1, 2, 3]]}"#,
            r#"{"id": 4, "path": [[1e39, 0]]}"#,
        ] {
            let decoded = decode_response(raw).unwrap();
            assert!(
                matches!(decoded, DecodedResponse::Malformed { id: CorrelationId(4), .. }),
                "{raw} -> {decoded:?}"
            );
        }
    }

    #[test]
    fn missing_id_is_unreadable() {
        assert!(decode_response(r#"{"path": null}"#).is_err());
        assert!(decode_response(r#"{"id": "x", "path": null}"#).is_err());
        assert!(decode_response("garbage").is_err());
    }
}

// ── Loopback transport ────────────────────────────────────────────────────────

#[cfg(test)]
mod loopback_channel {
    use crate::{HostChannel, Inbound};

    use super::*;

    #[test]
    fn frames_flow_both_ways() {
        let (mut chan, host) = loopback();
        chan.send("hello".into()).unwrap();
        assert_eq!(host.pending_requests(), 1);

        host.send_raw("world".into()).unwrap();
        assert_eq!(chan.poll(), vec![Inbound::Frame("world".into())]);
        assert!(chan.poll().is_empty());
    }

    #[test]
    fn dropped_peer_reports_disconnect_once() {
        let (mut chan, host) = loopback();
        host.send_raw("last words".into()).unwrap();
        drop(host);

        assert_eq!(
            chan.poll(),
            vec![Inbound::Frame("last words".into()), Inbound::Disconnected]
        );
        assert!(chan.poll().is_empty());
        assert!(chan.send("anyone?".into()).is_err());
    }

    #[test]
    fn closed_server_ends_blocking_receive() {
        let (chan, host) = loopback();
        chan.close();
        assert!(host.recv_request_blocking().is_none());
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod coordinator {
    use super::*;

    #[test]
    fn issues_fresh_ids() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        let b = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        assert_ne!(a.id, b.id);
        assert_eq!(coord.outstanding(), 2);
        assert_eq!(host.pending_requests(), 2);
        assert_eq!(a.deadline, Tick(10));
    }

    #[test]
    fn trivial_request_resolves_without_traffic() {
        let (mut coord, host) = coordinator(10);
        let call = coord.find_path(p(2.0, 2.0), p(2.05, 2.0), Tick(0));
        assert_eq!(call, PathCall::AlreadyThere);
        assert_eq!(host.pending_requests(), 0);
        assert_eq!(coord.outstanding(), 0);
    }

    #[test]
    fn host_sees_request_payload() {
        let (mut coord, host) = coordinator(10);
        let req = in_flight(coord.find_path(p(1.0, 2.0), p(3.0, 4.0), Tick(0)));
        let frame = host.try_recv_request().unwrap().unwrap();
        assert_eq!(frame.id, req.id);
        assert_eq!(
            frame.body,
            crate::HostRequest::FindPath { from: p(1.0, 2.0), to: p(3.0, 4.0) }
        );
    }

    #[test]
    fn responses_match_by_id_not_order() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        let b = in_flight(coord.find_path(p(0.0, 0.0), p(0.0, 5.0), Tick(0)));

        host.respond(b.id, Some(vec![p(0.0, 5.0)])).unwrap();
        host.respond(a.id, Some(vec![p(5.0, 0.0)])).unwrap();

        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, b.id);
        assert_eq!(resolved[0].outcome.as_deref().unwrap(), &[p(0.0, 5.0)]);
        assert_eq!(resolved[1].id, a.id);
        assert_eq!(resolved[1].outcome.as_deref().unwrap(), &[p(5.0, 0.0)]);
        assert_eq!(coord.outstanding(), 0);
    }

    #[test]
    fn null_path_resolves_as_no_path() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        host.respond(a.id, None).unwrap();
        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved[0].outcome, Err(PathFailure::NoPathFound));
        assert_eq!(coord.stats().no_path, 1);
    }

    #[test]
    fn timeout_fires_exactly_once() {
        let (mut coord, host) = coordinator(3);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));

        assert!(coord.poll(Tick(2)).is_empty());
        let resolved = coord.poll(Tick(3));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, a.id);
        assert_eq!(resolved[0].outcome, Err(PathFailure::Timeout));

        // Late answer: stale, nothing emitted.
        host.respond(a.id, Some(vec![p(5.0, 0.0)])).unwrap();
        assert!(coord.poll(Tick(4)).is_empty());
        assert!(coord.poll(Tick(50)).is_empty());
        assert_eq!(coord.stats().timed_out, 1);
        assert_eq!(coord.stats().stale, 1);
    }

    #[test]
    fn response_in_same_poll_beats_deadline() {
        let (mut coord, host) = coordinator(3);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        host.respond(a.id, Some(vec![p(5.0, 0.0)])).unwrap();
        let resolved = coord.poll(Tick(3));
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].outcome.is_ok());
    }

    #[test]
    fn forgotten_request_response_is_stale() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        coord.forget(a.id);
        assert!(!coord.is_tracking(a.id));

        host.respond(a.id, Some(vec![p(5.0, 0.0)])).unwrap();
        assert!(coord.poll(Tick(1)).is_empty());
        // A forgotten request does not time out either.
        assert!(coord.poll(Tick(100)).is_empty());
        assert_eq!(coord.stats().stale, 1);
    }

    #[test]
    fn unknown_id_is_stale() {
        let (mut coord, host) = coordinator(10);
        host.respond(CorrelationId(999), None).unwrap();
        assert!(coord.poll(Tick(0)).is_empty());
        assert_eq!(coord.stats().stale, 1);
    }

    #[test]
    fn malformed_response_fails_that_request_only() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        let b = in_flight(coord.find_path(p(0.0, 0.0), p(6.0, 0.0), Tick(0)));

        host.send_raw(format!(r#"{{"id": {}, "path": 17}}"#, a.id.get())).unwrap();
        host.send_raw("not even json".into()).unwrap();

        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, a.id);
        assert_eq!(resolved[0].outcome, Err(PathFailure::Malformed));
        assert!(coord.is_tracking(b.id));
    }

    #[test]
    fn disconnect_fails_everything_outstanding() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        let b = in_flight(coord.find_path(p(0.0, 0.0), p(6.0, 0.0), Tick(0)));
        drop(host);

        let resolved = coord.poll(Tick(1));
        let ids: Vec<_> = resolved.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert!(resolved.iter().all(|r| r.outcome == Err(PathFailure::ChannelFailure)));
        assert!(!coord.is_connected());

        // Further requests fail on the spot.
        assert_eq!(
            coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(2)),
            PathCall::Failed(PathFailure::ChannelFailure)
        );
    }

    #[test]
    fn send_failure_disconnects() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        drop(host);

        let call = coord.find_path(p(0.0, 0.0), p(7.0, 0.0), Tick(1));
        assert_eq!(call, PathCall::Failed(PathFailure::ChannelFailure));

        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, a.id);
        assert_eq!(resolved[0].outcome, Err(PathFailure::ChannelFailure));
    }

    #[test]
    fn reconnect_fails_old_and_serves_new() {
        let (mut coord, old_host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));

        let (chan, new_host) = loopback();
        coord.reconnect(chan);
        let b = in_flight(coord.find_path(p(0.0, 0.0), p(6.0, 0.0), Tick(1)));
        assert!(b.id > a.id);

        // The old link is gone; its peer can no longer reach the server.
        assert!(old_host.respond(a.id, Some(vec![p(5.0, 0.0)])).is_err());
        new_host.respond(b.id, Some(vec![p(6.0, 0.0)])).unwrap();

        let resolved = coord.poll(Tick(2));
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, a.id);
        assert_eq!(resolved[0].outcome, Err(PathFailure::ChannelFailure));
        assert_eq!(resolved[1].id, b.id);
        assert!(resolved[1].outcome.is_ok());
    }

    #[test]
    fn forget_after_reconnect_drops_queued_failure() {
        let (mut coord, _old_host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        let b = in_flight(coord.find_path(p(0.0, 0.0), p(6.0, 0.0), Tick(0)));

        let (chan, _new_host) = loopback();
        coord.reconnect(chan);
        coord.forget(a.id);

        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, b.id);
        assert_eq!(coord.stats().forgotten, 1);
    }

    #[test]
    fn forget_after_send_failure_drops_queued_failure() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        drop(host);
        coord.find_path(p(0.0, 0.0), p(7.0, 0.0), Tick(1));

        coord.forget(a.id);
        assert!(coord.poll(Tick(1)).is_empty());
    }

    #[test]
    fn forget_after_disconnect_poll_is_harmless() {
        let (mut coord, host) = coordinator(10);
        let a = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        drop(host);
        assert_eq!(coord.poll(Tick(1)).len(), 1);

        // Already reported; forgetting it again changes nothing.
        coord.forget(a.id);
        assert!(coord.poll(Tick(2)).is_empty());
        assert_eq!(coord.stats().forgotten, 0);
    }

    #[test]
    fn deadline_follows_config() {
        let (mut coord, _host) = coordinator(7);
        let req = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(3)));
        assert_eq!(req.deadline, config(7).deadline_from(Tick(3)));
        assert_eq!(req.deadline, Tick(10));
    }

    #[test]
    fn exhausted_ids_fail_without_reuse() {
        let (mut coord, host) = coordinator(10);
        coord.last_id = CorrelationId(u64::MAX - 2);

        let last = in_flight(coord.find_path(p(0.0, 0.0), p(5.0, 0.0), Tick(0)));
        assert_eq!(last.id, CorrelationId(u64::MAX - 1));

        let call = coord.find_path(p(0.0, 0.0), p(6.0, 0.0), Tick(0));
        assert_eq!(call, PathCall::Failed(PathFailure::ChannelFailure));
        assert_eq!(coord.outstanding(), 1);
        assert_eq!(host.pending_requests(), 1);

        // The earlier request is untouched.
        host.respond(last.id, Some(vec![p(5.0, 0.0)])).unwrap();
        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, last.id);
    }

    #[test]
    fn many_outstanding_do_not_cross() {
        let (mut coord, host) = coordinator(100);
        let reqs: Vec<_> = (1..=50)
            .map(|i| in_flight(coord.find_path(p(0.0, 0.0), p(i as f32, 0.0), Tick(0))))
            .collect();

        for req in reqs.iter().rev() {
            host.respond(req.id, Some(vec![req.destination])).unwrap();
        }
        let resolved = coord.poll(Tick(1));
        assert_eq!(resolved.len(), 50);
        for res in resolved {
            let req = reqs.iter().find(|r| r.id == res.id).unwrap();
            assert_eq!(res.outcome.as_deref().unwrap(), &[req.destination]);
        }
    }
}
