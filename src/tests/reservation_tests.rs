//! tests/reservation_tests.rs
//! Pruebas de la tabla de reservas: upsert, vencimientos y reintentos.

#[cfg(test)]
mod tests {
    use crate::models::reservation_model::{STATUS_CALLED, STATUS_ERROR, STATUS_WAITING};
    use crate::services::reservation_service::ReservationService;
    use crate::tests::memory_pool;
    use actix_rt::test;

    async fn service() -> ReservationService {
        let service = ReservationService::new(memory_pool().await);
        service.run_migrations().await.expect("migraciones ok");
        service
    }

    async fn upsert_sample(service: &ReservationService, id: &str, scheduled_at: &str) {
        service
            .upsert(
                id,
                "+819012345678",
                "早瀬弥生",
                "2026-09-10",
                "朝",
                scheduled_at,
            )
            .await
            .expect("upsert ok");
    }

    #[test]
    async fn test_upsert_is_idempotent_by_id() {
        let service = service().await;

        upsert_sample(&service, "ORD-1", "2026-09-10T09:15:00+09:00").await;
        upsert_sample(&service, "ORD-1", "2026-09-10T10:00:00+09:00").await;

        let statuses = service.list_statuses().await.expect("list ok");
        assert_eq!(statuses.len(), 1);

        let record = service.get("ORD-1").await.expect("get ok").expect("existe");
        assert_eq!(record.scheduled_at, "2026-09-10T10:00:00+09:00");
        assert_eq!(record.status, STATUS_WAITING);
    }

    #[test]
    async fn test_upsert_preserves_retry_bookkeeping() {
        let service = service().await;

        upsert_sample(&service, "ORD-1", "2026-09-10T09:15:00+09:00").await;
        service
            .schedule_retry("ORD-1", "2026-09-10T09:20:00+09:00", 2, "busy / unknown")
            .await
            .expect("retry ok");

        // Un re-import actualiza el pedido pero no pisa el contador.
        upsert_sample(&service, "ORD-1", "2026-09-10T11:00:00+09:00").await;

        let record = service.get("ORD-1").await.expect("get ok").expect("existe");
        assert_eq!(record.retry_count, 2);
        assert_eq!(record.status, STATUS_WAITING);
    }

    #[test]
    async fn test_due_reservations_filters_by_time_and_status() {
        let service = service().await;

        upsert_sample(&service, "ORD-pasada", "2026-09-10T09:00:00+09:00").await;
        upsert_sample(&service, "ORD-futura", "2026-09-10T18:30:00+09:00").await;
        upsert_sample(&service, "ORD-llamada", "2026-09-10T08:00:00+09:00").await;
        service
            .mark_called("ORD-llamada", "2026-09-10T08:05:00+09:00", "completed / human")
            .await
            .expect("mark_called ok");

        let due = service
            .due_reservations("2026-09-10T12:00:00+09:00")
            .await
            .expect("due ok");

        let ids: Vec<&str> = due.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ORD-pasada"]);
    }

    #[test]
    async fn test_mark_called_sets_final_fields() {
        let service = service().await;
        upsert_sample(&service, "ORD-1", "2026-09-10T09:00:00+09:00").await;

        service
            .mark_called("ORD-1", "2026-09-10T09:16:00+09:00", "completed / human")
            .await
            .expect("mark_called ok");

        let record = service.get("ORD-1").await.expect("get ok").expect("existe");
        assert_eq!(record.status, STATUS_CALLED);
        assert_eq!(record.called_at.as_deref(), Some("2026-09-10T09:16:00+09:00"));
        assert_eq!(record.last_call_status.as_deref(), Some("completed / human"));
    }

    #[test]
    async fn test_schedule_retry_updates_counter_and_time() {
        let service = service().await;
        upsert_sample(&service, "ORD-1", "2026-09-10T09:00:00+09:00").await;

        service
            .schedule_retry("ORD-1", "2026-09-10T09:05:00+09:00", 1, "no-answer / unknown")
            .await
            .expect("retry ok");

        let record = service.get("ORD-1").await.expect("get ok").expect("existe");
        assert_eq!(record.status, STATUS_WAITING);
        assert_eq!(record.retry_count, 1);
        assert_eq!(record.scheduled_at, "2026-09-10T09:05:00+09:00");
    }

    #[test]
    async fn test_mark_error_keeps_previous_call_status_if_none() {
        let service = service().await;
        upsert_sample(&service, "ORD-1", "2026-09-10T09:00:00+09:00").await;

        service
            .schedule_retry("ORD-1", "2026-09-10T09:05:00+09:00", 1, "busy / unknown")
            .await
            .expect("retry ok");
        service
            .mark_error("ORD-1", "audio faltante", None, None)
            .await
            .expect("mark_error ok");

        let record = service.get("ORD-1").await.expect("get ok").expect("existe");
        assert_eq!(record.status, STATUS_ERROR);
        assert_eq!(record.error_message.as_deref(), Some("audio faltante"));
        // COALESCE conserva el último estado de llamada conocido.
        assert_eq!(record.last_call_status.as_deref(), Some("busy / unknown"));
    }
}
