/// Item CRUD against a live Postgres; skipped without `DATABASE_URL`.
pub mod item_tests {
    use crate::db::{connect, DATABASE_URL};
    use crate::{errors::ModelError, item};
    use migration::MigratorTrait;
    use anyhow::Result;
    use uuid::Uuid;

    fn skip_db() -> bool {
        std::env::var("SKIP_DB_TESTS").is_ok() || DATABASE_URL.is_none()
    }

    #[tokio::test]
    async fn test_item_crud() -> Result<()> {
        if skip_db() { return Ok(()); }
        let db = connect().await?;
        migration::Migrator::up(&db, None).await?;

        let name = format!("item_{}", Uuid::new_v4());
        let created = item::create(&db, &format!("  {name} "), "quad", 199.99, "").await?;
        assert_eq!(created.name, name);
        assert_eq!(created.price, 199.99);
        assert_eq!(created.image, "");

        let found = item::find(&db, created.id).await?.expect("row exists");
        assert_eq!(found, created);

        let listed = item::list_ordered(&db).await?;
        assert!(listed.iter().any(|m| m.id == created.id));

        assert!(item::delete(&db, created.id).await?);
        assert!(item::find(&db, created.id).await?.is_none());
        // second delete reports nothing removed
        assert!(!item::delete(&db, created.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() -> Result<()> {
        if skip_db() { return Ok(()); }
        let db = connect().await?;
        migration::Migrator::up(&db, None).await?;

        assert!(matches!(item::create(&db, "", "", 1.0, "").await, Err(ModelError::Validation(_))));
        assert!(matches!(item::create(&db, "x", "", -1.0, "").await, Err(ModelError::Validation(_))));
        assert!(matches!(item::create(&db, "x", "", 1.0, "nope").await, Err(ModelError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() -> Result<()> {
        if skip_db() { return Ok(()); }
        let db = connect().await?;
        migration::Migrator::up(&db, None).await?;

        let tag = Uuid::new_v4();
        let mut ids = Vec::new();
        for i in 0..3 {
            let m = item::create(&db, &format!("ord_{tag}_{i}"), "", i as f64, "").await?;
            ids.push(m.id);
        }
        let listed: Vec<Uuid> = item::list_ordered(&db)
            .await?
            .into_iter()
            .filter(|m| m.name.starts_with(&format!("ord_{tag}_")))
            .map(|m| m.id)
            .collect();
        assert_eq!(listed, ids);

        for id in ids { item::delete(&db, id).await?; }
        Ok(())
    }

    #[tokio::test]
    async fn test_rapid_inserts_list_by_sequence() -> Result<()> {
        if skip_db() { return Ok(()); }
        let db = connect().await?;
        migration::Migrator::up(&db, None).await?;

        let tag = Uuid::new_v4();
        let mut created = Vec::new();
        for i in 0..20 {
            created.push(item::create(&db, &format!("seq_{tag}_{i}"), "", 1.0, "").await?);
        }
        assert!(created.windows(2).all(|w| w[0].seq < w[1].seq));

        let listed: Vec<Uuid> = item::list_ordered(&db)
            .await?
            .into_iter()
            .filter(|m| m.name.starts_with(&format!("seq_{tag}_")))
            .map(|m| m.id)
            .collect();
        let expected: Vec<Uuid> = created.iter().map(|m| m.id).collect();
        assert_eq!(listed, expected);

        for m in created { item::delete(&db, m.id).await?; }
        Ok(())
    }
}
