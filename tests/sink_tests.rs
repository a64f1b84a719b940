//! Async build and filesystem sink

#[cfg(feature = "native-fs")]
mod sink {
    use phantom_pbi_export::config::ExportConfig;
    use phantom_pbi_export::export::{
        FileSystemSink, FixedClock, PackageSink, ProjectExporter, SequentialIdGenerator,
    };
    use phantom_pbi_export::models::{DashboardItem, DataSnapshot, GridLayout, Scenario};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn exporter() -> ProjectExporter {
        ProjectExporter::new(ExportConfig::default())
            .with_ids(Arc::new(SequentialIdGenerator::new(9)))
            .with_clock(Arc::new(FixedClock::on_date(2024, 1, 31)))
    }

    fn items() -> Vec<DashboardItem> {
        vec![DashboardItem::new(
            "mrr",
            "card",
            "MRR",
            GridLayout::new(0, 0, 4, 2),
            json!({"metric": "mrr"}),
        )]
    }

    #[tokio::test]
    async fn test_async_build_matches_sync_build() {
        let snapshot = DataSnapshot::default();
        let sync = exporter().build(&items(), Scenario::SaaS, &snapshot).unwrap();
        let built = exporter()
            .build_async(&items(), Scenario::SaaS, &snapshot)
            .await
            .unwrap();

        assert_eq!(sync.archive, built.archive);
        assert_eq!(sync.filename, built.filename);
    }

    #[tokio::test]
    async fn test_sink_writes_archive_and_guide() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("exports");
        let package = exporter()
            .build_async(&items(), Scenario::SaaS, &DataSnapshot::default())
            .await
            .unwrap();

        let path = FileSystemSink::new(&out).save(&package).await.unwrap();

        assert_eq!(path, out.join("Phantom_SaaS_2024-01-31.zip"));
        assert_eq!(std::fs::read(&path).unwrap(), package.archive);
        let guide = std::fs::read_to_string(out.join("Phantom_SaaS_2024-01-31.md")).unwrap();
        assert_eq!(guide, package.documentation);
    }

    #[tokio::test]
    async fn test_sink_without_documentation() {
        let temp = TempDir::new().unwrap();
        let package = exporter()
            .build(&items(), Scenario::SaaS, &DataSnapshot::default())
            .unwrap();

        let sink = FileSystemSink::new(temp.path()).without_documentation();
        let path = sink.save(&package).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("md").exists());
    }
}
