//! # Async Get/Set Flows
//!
//! Batched requests answered through the client callback: results grouped per
//! client, deadlines grouped per client, best-effort cancellation.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};
    use vehicle_stub::testing::{AutoReply, CallbackEvent, RecordingCallback};
    use vehicle_stub::{AsyncGetSetRequest, StubError, VehicleStubApi};
    use vhal_types::{
        CarPropMgrErrorCode, CarPropertyErrorCodes, GetValueResult, HalError, RequestId,
        SetValueResult, StatusCode, VehiclePropValue,
    };

    const NON_OK_STATUSES: [StatusCode; 10] = [
        StatusCode::TryAgain,
        StatusCode::InvalidArg,
        StatusCode::NotAvailable,
        StatusCode::AccessDenied,
        StatusCode::InternalError,
        StatusCode::NotAvailableDisabled,
        StatusCode::NotAvailableSpeedLow,
        StatusCode::NotAvailableSpeedHigh,
        StatusCode::NotAvailablePoorVisibility,
        StatusCode::NotAvailableSafety,
    ];

    fn expected_error_code(status: StatusCode) -> CarPropMgrErrorCode {
        match status {
            StatusCode::Ok => CarPropMgrErrorCode::Ok,
            StatusCode::TryAgain => CarPropMgrErrorCode::TryAgain,
            status if status.is_not_available() => CarPropMgrErrorCode::NotAvailable,
            _ => CarPropMgrErrorCode::InternalError,
        }
    }

    fn service_ids(event: &CallbackEvent) -> Vec<i32> {
        match event {
            CallbackEvent::GetResults(results) => {
                results.iter().map(|r| r.service_request_id()).collect()
            }
            CallbackEvent::SetResults(results) => {
                results.iter().map(|r| r.service_request_id()).collect()
            }
            CallbackEvent::Timeout(ids) => ids.clone(),
        }
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    #[tokio::test]
    async fn test_batch_results_reach_client_in_one_call() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, mut rx) = RecordingCallback::new();

        stub.get_async(long_lived_requests(10, 3), callback).unwrap();
        assert_eq!(stub.count_pending_requests(), 3);

        let ids = hal.get_request_ids();
        assert_eq!(ids.len(), 3);
        for id in &ids {
            assert_eq!(stub.pools_holding(*id), 1);
        }

        let results = ids
            .iter()
            .map(|id| GetValueResult::ok(*id, VehiclePropValue::new(PERF_VEHICLE_SPEED, 0)))
            .collect();
        hal.deliver_get_results(results);

        let event = next_event(&mut rx).await;
        let mut delivered = service_ids(&event);
        delivered.sort_unstable();
        assert_eq!(delivered, vec![10, 11, 12]);
        match event {
            CallbackEvent::GetResults(results) => assert!(results.iter().all(|r| r.is_success())),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(stub.count_pending_requests(), 0);
        assert_quiet(&mut rx, Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_results_are_grouped_per_client() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (first, mut first_rx) = RecordingCallback::new();
        let (second, mut second_rx) = RecordingCallback::new();

        stub.set_async(long_lived_requests(1, 2), first).unwrap();
        stub.set_async(long_lived_requests(1, 1), second).unwrap();

        let results = hal
            .set_request_ids()
            .into_iter()
            .map(|id| SetValueResult::new(id, StatusCode::Ok))
            .collect();
        hal.deliver_set_results(results);

        assert_eq!(service_ids(&next_event(&mut first_rx).await), vec![1, 2]);
        assert_eq!(service_ids(&next_event(&mut second_rx).await), vec![1]);
        assert_quiet(&mut first_rx, Duration::from_millis(30)).await;
        assert_quiet(&mut second_rx, Duration::from_millis(30)).await;
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, _rx) = RecordingCallback::new();

        let err = stub.get_async(Vec::new(), callback).unwrap_err();
        assert!(matches!(err, StubError::InvalidArgument(_)));
        assert!(hal.get_batches().is_empty());
    }

    #[tokio::test]
    async fn test_echo_vhal_answers_async_set_then_get() {
        let (stub, _hal) = stub_with(AutoReply::Echo);
        let (callback, mut rx) = RecordingCallback::new();
        let deadline = Instant::now() + Duration::from_secs(60);

        stub.set_async(
            vec![AsyncGetSetRequest::new(7, hvac_value(22.0), deadline)],
            callback.clone(),
        )
        .unwrap();
        assert!(matches!(next_event(&mut rx).await, CallbackEvent::SetResults(_)));

        stub.get_async(
            vec![AsyncGetSetRequest::new(8, hvac_value(0.0), deadline)],
            callback,
        )
        .unwrap();
        match next_event(&mut rx).await {
            CallbackEvent::GetResults(results) => {
                let value = results[0].value().expect("value was set");
                assert_eq!(value.values().float_values, vec![22.0]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    // =========================================================================
    // DEADLINES
    // =========================================================================

    #[tokio::test]
    async fn test_shared_deadline_fires_one_timeout_call() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, mut rx) = RecordingCallback::new();
        let deadline = Instant::now() + Duration::from_millis(50);

        stub.get_async(requests_with_deadline(1, 3, deadline), callback)
            .unwrap();

        let mut timed_out = match next_event(&mut rx).await {
            CallbackEvent::Timeout(ids) => ids,
            other => panic!("unexpected event {other:?}"),
        };
        timed_out.sort_unstable();
        assert_eq!(timed_out, vec![1, 2, 3]);
        assert!(Instant::now() >= deadline);

        assert_quiet(&mut rx, Duration::from_millis(100)).await;
        assert_eq!(stub.count_pending_requests(), 0);
        assert_eq!(stub.stats().timeouts, 3);

        // Late results are dropped, not delivered.
        let late = hal
            .get_request_ids()
            .into_iter()
            .map(|id| GetValueResult::status_only(id, StatusCode::Ok))
            .collect();
        hal.deliver_get_results(late);
        assert_quiet(&mut rx, Duration::from_millis(30)).await;
        assert_eq!(stub.stats().dropped_results, 3);
    }

    #[tokio::test]
    async fn test_answered_requests_do_not_time_out() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, mut rx) = RecordingCallback::new();
        let deadline = Instant::now() + Duration::from_millis(80);

        stub.set_async(requests_with_deadline(1, 2, deadline), callback)
            .unwrap();
        let ids = hal.set_request_ids();
        hal.deliver_set_results(vec![SetValueResult::new(ids[0], StatusCode::Ok)]);

        assert_eq!(service_ids(&next_event(&mut rx).await), vec![1]);
        match next_event(&mut rx).await {
            CallbackEvent::Timeout(ids) => assert_eq!(ids, vec![2]),
            other => panic!("unexpected event {other:?}"),
        }
        assert_quiet(&mut rx, Duration::from_millis(50)).await;
    }

    // =========================================================================
    // CANCELLATION
    // =========================================================================

    #[tokio::test]
    async fn test_cancelled_request_gets_no_result_or_timeout() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, mut rx) = RecordingCallback::new();
        let deadline = Instant::now() + Duration::from_millis(60);

        stub.get_async(requests_with_deadline(1, 2, deadline), callback)
            .unwrap();
        stub.cancel_requests(&[1, 404]);
        assert_eq!(stub.count_pending_requests(), 1);
        assert_eq!(stub.stats().cancelled, 1);

        let cancelled_id = hal.get_request_ids()[0];
        hal.deliver_get_results(vec![GetValueResult::status_only(cancelled_id, StatusCode::Ok)]);

        match next_event(&mut rx).await {
            CallbackEvent::Timeout(ids) => assert_eq!(ids, vec![2]),
            other => panic!("unexpected event {other:?}"),
        }
        assert_quiet(&mut rx, Duration::from_millis(100)).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_racing_result_resolves_exactly_once() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, mut rx) = RecordingCallback::new();

        for service_id in 0..64 {
            let cancelled_before = stub.stats().cancelled;
            stub.get_async(long_lived_requests(service_id, 1), callback.clone())
                .unwrap();
            let id = *hal.get_request_ids().last().expect("batch recorded");

            thread::scope(|scope| {
                scope.spawn(|| stub.cancel_requests(&[service_id]));
                scope.spawn(|| {
                    hal.deliver_get_results(vec![GetValueResult::status_only(
                        id,
                        StatusCode::TryAgain,
                    )])
                });
            });

            let mut delivered = 0;
            while let Ok(event) = rx.try_recv() {
                assert_eq!(service_ids(&event), vec![service_id]);
                delivered += 1;
            }
            let cancelled = stub.stats().cancelled - cancelled_before;
            assert_eq!(delivered + cancelled, 1, "request {service_id}");
            assert_eq!(stub.count_pending_requests(), 0);
        }
    }

    // =========================================================================
    // ERROR CODES
    // =========================================================================

    #[tokio::test]
    async fn test_non_ok_status_maps_to_error_triple() {
        for status in NON_OK_STATUSES {
            let (stub, _hal) = stub_with(AutoReply::Status(status));
            let (callback, mut rx) = RecordingCallback::new();
            let expected = CarPropertyErrorCodes::new(expected_error_code(status), 0, status.code());

            stub.get_async(long_lived_requests(1, 1), callback.clone())
                .unwrap();
            match next_event(&mut rx).await {
                CallbackEvent::GetResults(results) => {
                    assert!(results[0].value().is_none());
                    assert_eq!(results[0].error_codes(), expected, "get with {status}");
                }
                other => panic!("unexpected event {other:?}"),
            }

            stub.set_async(long_lived_requests(2, 1), callback).unwrap();
            match next_event(&mut rx).await {
                CallbackEvent::SetResults(results) => {
                    assert_eq!(results[0].error_codes(), expected, "set with {status}");
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_ok_without_value_is_not_available() {
        let (stub, _hal) = stub_with(AutoReply::Status(StatusCode::Ok));
        let (callback, mut rx) = RecordingCallback::new();

        stub.get_async(long_lived_requests(1, 1), callback).unwrap();

        match next_event(&mut rx).await {
            CallbackEvent::GetResults(results) => {
                let result = &results[0];
                assert!(!result.is_success());
                assert_eq!(result.error_code(), CarPropMgrErrorCode::NotAvailable);
                assert_ne!(result.error_codes(), CarPropertyErrorCodes::internal_error());
                assert_eq!(result.error_codes(), CarPropertyErrorCodes::not_available());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_failure_reports_error_for_every_request() {
        let (stub, hal) = stub_with(AutoReply::Echo);
        let (callback, mut rx) = RecordingCallback::new();
        let raw = (0x42 << 16) | StatusCode::TryAgain.code();
        hal.fail_sends_with(Some(HalError::service_specific(raw, "busy")));

        stub.set_async(long_lived_requests(5, 2), callback.clone())
            .unwrap();
        match next_event(&mut rx).await {
            CallbackEvent::SetResults(results) => {
                assert_eq!(results.len(), 2);
                for result in results {
                    assert_eq!(result.error_code(), CarPropMgrErrorCode::TryAgain);
                    assert_eq!(result.vendor_error_code(), 0x42);
                }
            }
            other => panic!("unexpected event {other:?}"),
        }

        hal.fail_sends_with(Some(HalError::remote("binder died")));
        stub.get_async(long_lived_requests(7, 1), callback).unwrap();
        match next_event(&mut rx).await {
            CallbackEvent::GetResults(results) => {
                assert_eq!(results[0].error_codes(), CarPropertyErrorCodes::internal_error());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(stub.count_pending_requests(), 0);
    }

    // =========================================================================
    // BATCH SHAPE
    // =========================================================================

    #[tokio::test]
    async fn test_single_async_request_matches_sync_batch_shape() {
        let (stub, hal) = stub_with(AutoReply::Echo);
        let (callback, mut rx) = RecordingCallback::new();

        stub.get(&hvac_value(0.0)).await.unwrap();
        stub.get_async(
            vec![AsyncGetSetRequest::with_timeout(
                1,
                hvac_value(0.0),
                Duration::from_secs(60),
            )],
            callback,
        )
        .unwrap();
        next_event(&mut rx).await;

        let batches = hal.get_batches();
        assert_eq!(batches.len(), 2);
        let (sync_batch, async_batch) = (&batches[0], &batches[1]);
        assert_eq!(sync_batch.payloads.len(), 1);
        assert_eq!(async_batch.payloads.len(), 1);
        assert_eq!(sync_batch.payloads[0].prop, async_batch.payloads[0].prop);
        assert_ne!(
            sync_batch.payloads[0].request_id,
            async_batch.payloads[0].request_id
        );
        assert!(async_batch.payloads[0].request_id > RequestId::new(0));
    }

    #[test]
    fn test_every_pending_id_lives_in_exactly_one_pool() {
        let (stub, hal) = stub_with(AutoReply::Never);
        let (callback, _rx) = RecordingCallback::new();

        stub.get_async(long_lived_requests(1, 4), Arc::clone(&callback) as _)
            .unwrap();
        stub.set_async(long_lived_requests(1, 4), callback).unwrap();

        let mut ids = hal.get_request_ids();
        ids.extend(hal.set_request_ids());
        assert_eq!(ids.len(), 8);
        for id in ids {
            assert_eq!(stub.pools_holding(id), 1, "{id}");
        }
    }
}
