//! tests/import_tests.rs
//! Pruebas del import de CSV: idempotencia, validación y errores por fila.

#[cfg(test)]
mod tests {
    use crate::services::import_service::ImportService;
    use crate::services::reservation_service::ReservationService;
    use crate::tests::memory_pool;
    use actix_rt::test;
    use std::fs;
    use std::path::PathBuf;

    async fn reservation_service() -> ReservationService {
        let service = ReservationService::new(memory_pool().await);
        service.run_migrations().await.expect("migraciones ok");
        service
    }

    /// Escribe un CSV temporal con nombre único y devuelve la ruta.
    fn write_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("import_test_{}_{}", std::process::id(), name));
        fs::write(&path, contents).expect("No se pudo escribir el CSV de prueba");
        path
    }

    #[test]
    async fn test_import_happy_path() {
        let reservations = reservation_service().await;
        let importer = ImportService::new(reservations.clone());

        let csv_path = write_csv(
            "ok.csv",
            "order_id,phone_number,oshi_name,preferred_date,time_slot\n\
             ORD-1,090-1234-5678,早瀬弥生,2026-09-10,朝\n\
             ORD-2,080 2345 6789,ちろる,2026-09-10,15:30\n",
        );

        let summary = importer.import_csv(&csv_path).await.expect("import ok");
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.errors, 0);

        let record = reservations
            .get("ORD-1")
            .await
            .expect("get ok")
            .expect("existe");
        assert_eq!(record.phone_number, "+819012345678");
        assert_eq!(record.status, "waiting");
        // El horario sorteado queda en JST.
        assert!(record.scheduled_at.ends_with("+09:00"));

        let exact = reservations
            .get("ORD-2")
            .await
            .expect("get ok")
            .expect("existe");
        assert!(exact.scheduled_at.contains("15:30:00"));

        let _ = fs::remove_file(csv_path);
    }

    #[test]
    async fn test_missing_columns_abort_before_processing() {
        let reservations = reservation_service().await;
        let importer = ImportService::new(reservations.clone());

        let csv_path = write_csv(
            "cols.csv",
            "order_id,phone_number\nORD-1,090-1234-5678\n",
        );

        let result = importer.import_csv(&csv_path).await;
        assert!(result.is_err());
        assert!(reservations
            .list_statuses()
            .await
            .expect("list ok")
            .is_empty());

        let _ = fs::remove_file(csv_path);
    }

    #[test]
    async fn test_reimport_skips_called_orders() {
        let reservations = reservation_service().await;
        let importer = ImportService::new(reservations.clone());

        let csv_path = write_csv(
            "reimport.csv",
            "order_id,phone_number,oshi_name,preferred_date,time_slot\n\
             ORD-1,090-1234-5678,早瀬弥生,2026-09-10,朝\n",
        );

        importer.import_csv(&csv_path).await.expect("primer import");
        reservations
            .mark_called("ORD-1", "2026-09-10T09:10:00+09:00", "completed / human")
            .await
            .expect("mark_called ok");

        let summary = importer.import_csv(&csv_path).await.expect("segundo import");
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, 1);

        // El pedido ya llamado quedó intacto.
        let record = reservations
            .get("ORD-1")
            .await
            .expect("get ok")
            .expect("existe");
        assert_eq!(record.status, "called");

        let _ = fs::remove_file(csv_path);
    }

    #[test]
    async fn test_bad_slot_is_row_error_and_rest_imports() {
        let reservations = reservation_service().await;
        let importer = ImportService::new(reservations.clone());

        let csv_path = write_csv(
            "badslot.csv",
            "order_id,phone_number,oshi_name,preferred_date,time_slot\n\
             ORD-1,090-1234-5678,早瀬弥生,2026-09-10,深夜\n\
             ORD-2,090-8765-4321,ちろる,2026-09-10,晩\n",
        );

        let summary = importer.import_csv(&csv_path).await.expect("import ok");
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.errors, 1);

        assert!(reservations.get("ORD-1").await.expect("get ok").is_none());
        assert!(reservations.get("ORD-2").await.expect("get ok").is_some());

        let _ = fs::remove_file(csv_path);
    }
}
