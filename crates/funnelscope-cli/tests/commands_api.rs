use funnelscope_cli::commands::{funnel, generate, load, metrics, read_dataset, report, sources};
use funnelscope_core::SimulationTables;
use tempfile::TempDir;

#[test]
fn test_same_seed_same_outcomes() {
    let tables = SimulationTables::default();
    let a = generate::generate_dataset(500, 11, &tables, false).unwrap();
    let b = generate::generate_dataset(500, 11, &tables, false).unwrap();

    let outcomes = |d: &funnelscope_core::dataset::Dataset| {
        d.sessions
            .iter()
            .map(|s| (s.traffic_source.clone(), s.device.clone(), s.completed_purchase))
            .collect::<Vec<_>>()
    };
    assert_eq!(outcomes(&a), outcomes(&b));
    assert_eq!(a.events.len(), b.events.len());
    assert_eq!(a.seed, Some(11));
}

#[test]
fn test_saved_dataset_reads_back() {
    let temp = TempDir::new().unwrap();
    let tables = SimulationTables::default();
    let dataset = generate::generate_dataset(200, 1, &tables, false).unwrap();

    let files = generate::save_dataset(&dataset, temp.path()).unwrap();
    assert_eq!(files.sessions, 200);
    assert_eq!(files.events, dataset.events.len());

    let read = read_dataset(temp.path()).unwrap();
    assert_eq!(read.sessions.len(), 200);
    assert_eq!(read.seed, Some(1));
}

#[test]
fn test_store_and_memory_agree_on_totals() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("funnel.db");
    let dataset =
        generate::generate_dataset(700, 21, &SimulationTables::default(), false).unwrap();

    let loaded = load::load_into_store(&dataset, &db).unwrap();
    assert_eq!(loaded.sessions, 700);

    let kpis = metrics::query_metrics(&db).unwrap();
    let in_memory = funnel::analyze_funnel(&dataset.sessions);

    assert_eq!(kpis.overall.total_sessions, 700);
    assert_eq!(
        kpis.overall.conversions as u64,
        in_memory.metrics.completed_purchase_count
    );
    assert_eq!(kpis.revenue.total_orders as u64, in_memory.metrics.completed_purchase_count);
}

#[test]
fn test_channels_cover_every_source() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("funnel.db");
    let tables = SimulationTables::default();
    let dataset = generate::generate_dataset(2000, 8, &tables, false).unwrap();
    load::load_into_store(&dataset, &db).unwrap();

    let channels = sources::query_channels(&db).unwrap();
    assert_eq!(channels.sources.len(), tables.traffic_sources.len());
    assert!(
        channels
            .sources
            .windows(2)
            .all(|w| w[0].conversions >= w[1].conversions)
    );
    assert!(channels.top_segments.len() <= 10);
}

#[test]
fn test_reports_from_directories() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");
    let db = temp.path().join("db.sqlite");
    let reports_dir = temp.path().join("out");

    let dataset =
        generate::generate_dataset(1000, 4, &SimulationTables::default(), false).unwrap();
    generate::save_dataset(&dataset, &data_dir).unwrap();
    load::load_into_store(&dataset, &db).unwrap();

    let files = report::generate_reports(&data_dir, &db, &reports_dir).unwrap();
    assert!(files.insights.exists());
    assert!(files.queries.exists());
    assert!(files.recommendations.exists());

    let csv = std::fs::read_to_string(&files.recommendations).unwrap();
    let priorities: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    let expected: Vec<String> = (1..=priorities.len()).map(|i| format!("P{}", i)).collect();
    assert_eq!(priorities, expected);
}

#[test]
fn test_reports_need_a_store() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");
    let dataset = generate::generate_dataset(50, 2, &SimulationTables::default(), false).unwrap();
    generate::save_dataset(&dataset, &data_dir).unwrap();

    let missing = temp.path().join("missing.db");
    let err = report::generate_reports(&data_dir, &missing, temp.path()).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    assert!(!missing.exists());
}
