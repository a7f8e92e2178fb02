//! tests/dispatch_tests.rs
//! Tabla de decisión del dispatcher y pasada en DRY_RUN de punta a punta.

#[cfg(test)]
mod tests {
    use crate::config::app_config::DispatchConfig;
    use crate::config::audio_map::AudioCatalog;
    use crate::models::reservation_model::{STATUS_CALLED, STATUS_ERROR};
    use crate::services::dispatch_service::{evaluate_call, CallOutcome, DispatchService};
    use crate::services::reservation_service::ReservationService;
    use crate::tests::memory_pool;
    use actix_rt::test as rt_test;
    use std::collections::HashMap;

    #[test]
    fn test_busy_with_budget_retries() {
        assert_eq!(evaluate_call("busy", None, 0, 3), CallOutcome::Retry);
        assert_eq!(
            evaluate_call("no-answer", Some("unknown"), 2, 3),
            CallOutcome::Retry
        );
        assert_eq!(evaluate_call("failed", None, 1, 3), CallOutcome::Retry);
    }

    #[test]
    fn test_machine_variants_retry() {
        for amd in ["machine_start", "machine_end_beep", "machine_end_silence"] {
            assert_eq!(
                evaluate_call("completed", Some(amd), 0, 3),
                CallOutcome::Retry,
                "AMD {} debería reintentar",
                amd
            );
        }
    }

    #[test]
    fn test_human_completed_is_called() {
        assert_eq!(
            evaluate_call("completed", Some("human"), 0, 3),
            CallOutcome::Called
        );
        // También con reintentos previos acumulados.
        assert_eq!(
            evaluate_call("completed", Some("human"), 3, 3),
            CallOutcome::Called
        );
    }

    #[test]
    fn test_budget_exhausted_finalizes_to_error() {
        // El contador nunca supera el máximo: al llegar al tope ya no
        // hay Retry posible.
        assert_eq!(evaluate_call("busy", None, 3, 3), CallOutcome::Error);
        assert_eq!(
            evaluate_call("completed", Some("machine_end_beep"), 3, 3),
            CallOutcome::Error
        );
    }

    #[test]
    fn test_unexpected_status_is_error() {
        assert_eq!(
            evaluate_call("completed", Some("fax"), 0, 3),
            CallOutcome::Error
        );
        assert_eq!(evaluate_call("canceled", None, 0, 3), CallOutcome::Error);
    }

    async fn reservation_service() -> ReservationService {
        let service = ReservationService::new(memory_pool().await);
        service.run_migrations().await.expect("migraciones ok");
        service
    }

    fn dry_run_config() -> DispatchConfig {
        DispatchConfig {
            dry_run: true,
            max_retry_count: 3,
            retry_interval_minutes: 5,
            status_poll_delay_secs: 0,
        }
    }

    #[rt_test]
    async fn test_dry_run_marks_due_reservation_called() {
        let reservations = reservation_service().await;
        reservations
            .upsert(
                "ORD-1",
                "+819012345678",
                "早瀬弥生",
                "2026-09-10",
                "朝",
                "2020-01-01T09:00:00+09:00",
            )
            .await
            .expect("upsert ok");

        let dispatch = DispatchService::new(
            reservations.clone(),
            None,
            AudioCatalog::default(),
            dry_run_config(),
        );
        dispatch.execute().await.expect("execute ok");

        let record = reservations
            .get("ORD-1")
            .await
            .expect("get ok")
            .expect("existe");
        assert_eq!(record.status, STATUS_CALLED);
        assert_eq!(record.last_call_status.as_deref(), Some("dry-run"));
        assert!(record.called_at.is_some());
    }

    #[rt_test]
    async fn test_missing_audio_mapping_is_row_error_and_batch_continues() {
        let reservations = reservation_service().await;
        reservations
            .upsert(
                "ORD-sin-audio",
                "+819011112222",
                "Desconocida",
                "2026-09-10",
                "朝",
                "2020-01-01T09:00:00+09:00",
            )
            .await
            .expect("upsert ok");
        reservations
            .upsert(
                "ORD-ok",
                "+819012345678",
                "ちろる",
                "2026-09-10",
                "朝",
                "2020-01-01T09:30:00+09:00",
            )
            .await
            .expect("upsert ok");

        let dispatch = DispatchService::new(
            reservations.clone(),
            None,
            AudioCatalog::from_map(HashMap::from([(
                "ちろる".to_string(),
                "https://example.com/chiroru.wav".to_string(),
            )])),
            dry_run_config(),
        );
        dispatch.execute().await.expect("execute ok");

        let bad = reservations
            .get("ORD-sin-audio")
            .await
            .expect("get ok")
            .expect("existe");
        assert_eq!(bad.status, STATUS_ERROR);
        assert!(bad.error_message.expect("hay mensaje").contains("Desconocida"));

        // La fila con error no cortó el resto del lote.
        let ok = reservations
            .get("ORD-ok")
            .await
            .expect("get ok")
            .expect("existe");
        assert_eq!(ok.status, STATUS_CALLED);
    }

    #[rt_test]
    async fn test_future_reservations_are_untouched() {
        let reservations = reservation_service().await;
        reservations
            .upsert(
                "ORD-futura",
                "+819012345678",
                "早瀬弥生",
                "2099-01-01",
                "朝",
                "2099-01-01T09:00:00+09:00",
            )
            .await
            .expect("upsert ok");

        let dispatch = DispatchService::new(
            reservations.clone(),
            None,
            AudioCatalog::default(),
            dry_run_config(),
        );
        dispatch.execute().await.expect("execute ok");

        let record = reservations
            .get("ORD-futura")
            .await
            .expect("get ok")
            .expect("existe");
        assert_eq!(record.status, "waiting");
    }
}
