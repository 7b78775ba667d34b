#[cfg(test)]
mod tests {
    use crate::{
        models::radar_item::{NewRadarItem, RadarItem},
        services::radar_items::RadarItemsService,
        tests::helpers::setup_db,
    };

    fn new_item(url: &str, title: Option<&str>) -> NewRadarItem {
        NewRadarItem {
            url: url.to_owned(),
            title: title.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let db = setup_db().await;

        let saved = RadarItem::save(&new_item(" https://a.example ", Some("A")), &db)
            .await
            .unwrap();
        assert_eq!(saved.url, "https://a.example");
        assert_eq!(saved.title, "A");
        assert!(!saved.archived);
        assert!(!saved.created_at.is_empty());

        let found = RadarItem::find(&db, saved.id).await.unwrap();
        assert_eq!(found, Some(saved));
        assert_eq!(RadarItem::find(&db, 12345).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_archive_hides_items_from_open_list() {
        let db = setup_db().await;
        let mut ids = Vec::new();
        for n in 0..3 {
            let item = RadarItem::save(&new_item(&format!("https://x.example/{n}"), None), &db)
                .await
                .unwrap();
            ids.push(item.id);
        }

        let archived = RadarItem::archive(&db, &ids[..2]).await.unwrap();
        assert_eq!(archived, 2);

        let open = RadarItem::list_open(&db).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, ids[2]);

        let first = RadarItem::find(&db, ids[0]).await.unwrap().unwrap();
        assert!(first.archived);
    }

    #[tokio::test]
    async fn test_archive_nothing() {
        let db = setup_db().await;
        assert_eq!(RadarItem::archive(&db, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_archive_many_ids_in_batches() {
        let db = setup_db().await;
        let mut ids = Vec::new();
        for n in 0..1200 {
            let item = RadarItem::save(&new_item(&format!("https://x.example/{n}"), None), &db)
                .await
                .unwrap();
            ids.push(item.id);
        }

        assert_eq!(RadarItem::archive(&db, &ids).await.unwrap(), 1200);
        assert!(RadarItem::list_open(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_list_is_oldest_first() {
        let db = setup_db().await;
        for url in ["https://1.example", "https://2.example", "https://3.example"] {
            RadarItem::save(&new_item(url, None), &db).await.unwrap();
        }

        let urls: Vec<_> = RadarItem::list_open(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.url)
            .collect();
        assert_eq!(
            urls,
            vec!["https://1.example", "https://2.example", "https://3.example"]
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let db = setup_db().await;
        let item = RadarItem::save(&new_item("https://a.example", None), &db)
            .await
            .unwrap();

        assert!(RadarItem::delete(&db, item.id).await.unwrap());
        assert!(!RadarItem::delete(&db, item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_service_round_trip() {
        let db = setup_db().await;
        let service = RadarItemsService::new(Some(db));

        assert!(!service.is_degraded());
        service.ping().await.unwrap();

        let item = service
            .create(&new_item("https://a.example", Some("A")))
            .await
            .unwrap();
        assert_eq!(service.get(item.id).await.unwrap(), Some(item.clone()));
        assert_eq!(service.list_open().await.unwrap().len(), 1);
        assert_eq!(service.archive(&[item.id]).await.unwrap(), 1);
        assert!(service.list_open().await.unwrap().is_empty());
        assert!(service.delete(item.id).await.unwrap());
    }
}
