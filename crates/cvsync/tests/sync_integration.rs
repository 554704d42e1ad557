//! End-to-end sync passes against an in-memory SQLite store.
//!
//! The API is replaced by a scripted page source so each test controls
//! exactly which pages exist and which fail.

#![cfg(feature = "sqlite")]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cvsync::sync::{PageRequest, PageSource, ProgressCallback, ResourceFailure};
use cvsync::{
    Development, FetchError, Notification, Notifier, NotifyError, OperatingWindow, Payout,
    Resource, RunError, Sale, SaleColumn, Store, SyncEngine, SyncOptions, SyncOutcome,
    SyncProgress, Unit, connect_and_migrate,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

type Page = Result<Vec<Value>, FetchError>;

#[derive(Default)]
struct ApiState {
    pages: HashMap<Resource, VecDeque<Page>>,
    calls: Vec<(Resource, u32)>,
}

/// Serves scripted pages per resource; an exhausted script answers empty.
#[derive(Clone, Default)]
struct ScriptedApi(Arc<Mutex<ApiState>>);

impl ScriptedApi {
    fn page(self, resource: Resource, records: Vec<Value>) -> Self {
        self.push(resource, Ok(records))
    }

    fn failure(self, resource: Resource, err: FetchError) -> Self {
        self.push(resource, Err(err))
    }

    fn push(self, resource: Resource, page: Page) -> Self {
        self.0
            .lock()
            .expect("lock")
            .pages
            .entry(resource)
            .or_default()
            .push_back(page);
        self
    }

    fn calls(&self) -> Vec<(Resource, u32)> {
        self.0.lock().expect("lock").calls.clone()
    }

    fn fetched(&self, resource: Resource) -> usize {
        self.calls().iter().filter(|(r, _)| *r == resource).count()
    }
}

#[async_trait]
impl PageSource for ScriptedApi {
    async fn fetch_page(
        &self,
        request: PageRequest,
        _on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Value>, FetchError> {
        let mut state = self.0.lock().expect("lock");
        state.calls.push((request.resource, request.page));
        state
            .pages
            .get_mut(&request.resource)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Arc<Mutex<Vec<Notification>>>);

impl RecordingNotifier {
    fn sent(&self) -> Vec<Notification> {
        self.0.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.0.lock().expect("lock").push(notification.clone());
        Ok(())
    }
}

async fn setup_db() -> Arc<DatabaseConnection> {
    Arc::new(
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("Failed to create test database"),
    )
}

fn engine(
    db: &Arc<DatabaseConnection>,
    api: &ScriptedApi,
    notifier: &RecordingNotifier,
) -> SyncEngine<ScriptedApi, Store> {
    SyncEngine::new(Arc::clone(db), api.clone(), Store::new(Arc::clone(db)))
        .with_notifier(Arc::new(notifier.clone()))
}

fn sale(id: i64, reserva_id: i64, active: &str, date: &str) -> Value {
    json!({
        "id": id,
        "reserva_id": reserva_id,
        "empreendimento": "Residencial Aurora",
        "corretor": "Ana",
        "time_corretor": "Time Norte",
        "cliente": "Cliente",
        "valor": "350000.00",
        "data_venda": date,
        "ativo": active
    })
}

fn ids(range: std::ops::Range<i64>) -> Vec<Value> {
    range.map(|id| json!({ "id": id })).collect()
}

fn completed(outcome: SyncOutcome) -> cvsync::SyncSummary {
    match outcome {
        SyncOutcome::Completed(summary) => summary,
        SyncOutcome::Skipped { local_hour } => panic!("unexpected skip at hour {local_hour}"),
    }
}

#[tokio::test]
async fn resources_run_in_dependency_order() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .page(Resource::Development, ids(1..3))
        .page(Resource::Unit, ids(10..13))
        .page(Resource::Sale, vec![sale(100, 7, "S", "2025-01-15")]);
    let notifier = RecordingNotifier::default();

    let summary = completed(
        engine(&db, &api, &notifier)
            .run_full_sync()
            .await
            .expect("pass should succeed"),
    );

    let mut order: Vec<Resource> = Vec::new();
    for (resource, _) in api.calls() {
        if order.last() != Some(&resource) {
            order.push(resource);
        }
    }
    assert_eq!(order, Resource::ALL.to_vec());

    assert_eq!(summary.written(Resource::Development), 2);
    assert_eq!(summary.written(Resource::Unit), 3);
    assert_eq!(summary.written(Resource::Sale), 1);
    assert_eq!(summary.degraded().count(), 0);
    assert!(matches!(notifier.sent().as_slice(), [Notification::Success(_)]));
}

#[tokio::test]
async fn repeated_pass_leaves_row_counts_unchanged() {
    let db = setup_db().await;
    let script = || {
        ScriptedApi::default()
            .page(Resource::Development, ids(1..4))
            .page(Resource::Unit, ids(1..6))
            .page(
                Resource::Sale,
                vec![sale(1, 11, "S", "2025-02-01"), sale(2, 12, "S", "02/02/2025")],
            )
    };
    let notifier = RecordingNotifier::default();

    engine(&db, &script(), &notifier)
        .run_full_sync()
        .await
        .expect("first pass");
    let first = Sale::find()
        .filter(SaleColumn::CvcrmId.eq(1))
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("sale row");

    engine(&db, &script(), &notifier)
        .run_full_sync()
        .await
        .expect("second pass");

    assert_eq!(Development::find().count(db.as_ref()).await.expect("count"), 3);
    assert_eq!(Unit::find().count(db.as_ref()).await.expect("count"), 5);
    assert_eq!(Sale::find().count(db.as_ref()).await.expect("count"), 2);

    let second = Sale::find()
        .filter(SaleColumn::CvcrmId.eq(1))
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("sale row");
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
async fn only_confirmed_reservations_become_sales() {
    let db = setup_db().await;
    let api = ScriptedApi::default().page(
        Resource::Sale,
        vec![
            sale(1, 11, "S", "2025-03-01"),
            sale(2, 12, "N", "2025-03-01"),
            sale(3, 13, "S", ""),
            sale(4, 14, "S", "  "),
            json!({ "id": 5, "ativo": "S" }),
        ],
    );

    let summary = completed(
        engine(&db, &api, &RecordingNotifier::default())
            .run_full_sync()
            .await
            .expect("pass"),
    );

    let sales = Sale::find().all(db.as_ref()).await.expect("query");
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].cvcrm_id, 1);
    assert_eq!(sales[0].status.as_deref(), Some("Vendido"));
    assert_eq!(sales[0].vgv, Some(350_000.0));
    assert_eq!(summary.written(Resource::Sale), 1);
}

#[tokio::test]
async fn commissions_update_matching_sales_only() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .page(
            Resource::Sale,
            vec![sale(1, 11, "S", "2025-03-01"), sale(2, 12, "S", "2025-03-02")],
        )
        .page(
            Resource::Commission,
            vec![
                json!({ "reserva_id": 11, "valor_comissao": "12000,50", "percentual_comissao": 4 }),
                json!({ "venda_id": 2, "valor_comissao": 8000 }),
                json!({ "reserva_id": 999, "valor_comissao": 1 }),
                json!({ "valor_comissao": 5 }),
            ],
        );

    let summary = completed(
        engine(&db, &api, &RecordingNotifier::default())
            .run_full_sync()
            .await
            .expect("pass"),
    );

    let by_id = |id: i64| {
        let db = Arc::clone(&db);
        async move {
            Sale::find()
                .filter(SaleColumn::CvcrmId.eq(id))
                .one(db.as_ref())
                .await
                .expect("query")
                .expect("sale row")
        }
    };
    let first = by_id(1).await;
    assert_eq!(first.commission_amount, Some(12_000.5));
    assert_eq!(first.commission_percent, Some(4.0));
    let second = by_id(2).await;
    assert_eq!(second.commission_amount, Some(8000.0));
    assert_eq!(second.commission_percent, None);

    assert_eq!(Sale::find().count(db.as_ref()).await.expect("count"), 2);
    // Three records carried a key; the keyless one is skipped.
    assert_eq!(summary.written(Resource::Commission), 3);
}

#[tokio::test]
async fn sale_conditions_fill_financing_terms() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .page(Resource::Sale, vec![sale(1, 11, "S", "2025-03-01")])
        .page(
            Resource::SaleCondition,
            vec![json!({
                "reserva_id": 11,
                "valor_financiamento": "280000",
                "valor_entrada": 70000,
                "numero_parcelas": "360"
            })],
        );

    engine(&db, &api, &RecordingNotifier::default())
        .run_full_sync()
        .await
        .expect("pass");

    let row = Sale::find().one(db.as_ref()).await.expect("query").expect("sale row");
    assert_eq!(row.financing_amount, Some(280_000.0));
    assert_eq!(row.down_payment, Some(70_000.0));
    assert_eq!(row.installments, Some(360));
}

#[tokio::test]
async fn pages_until_empty_page() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .page(Resource::Unit, ids(0..50))
        .page(Resource::Unit, ids(50..100))
        .page(Resource::Unit, ids(100..150))
        .page(Resource::Unit, vec![]);

    let summary = completed(
        engine(&db, &api, &RecordingNotifier::default())
            .run_full_sync()
            .await
            .expect("pass"),
    );

    let unit_pages: Vec<u32> = api
        .calls()
        .into_iter()
        .filter(|(r, _)| *r == Resource::Unit)
        .map(|(_, p)| p)
        .collect();
    assert_eq!(unit_pages, vec![1, 2, 3, 4]);
    assert_eq!(summary.written(Resource::Unit), 150);
    assert_eq!(Unit::find().count(db.as_ref()).await.expect("count"), 150);
}

#[tokio::test]
async fn cap_stops_paging_early() {
    let db = setup_db().await;
    let mut api = ScriptedApi::default();
    for page in 0..5 {
        api = api.page(Resource::Development, ids(page * 2..page * 2 + 2));
    }
    let mut options = SyncOptions {
        page_size: 2,
        ..SyncOptions::default()
    };
    options.caps.insert(Resource::Development, 4);

    let summary = completed(
        engine(&db, &api, &RecordingNotifier::default())
            .with_options(options)
            .run_full_sync()
            .await
            .expect("pass"),
    );

    assert_eq!(api.fetched(Resource::Development), 2);
    assert_eq!(summary.written(Resource::Development), 4);
    let report = summary
        .resources
        .iter()
        .find(|r| r.resource == "developments")
        .expect("developments report");
    assert!(report.stats.capped);
}

#[tokio::test]
async fn closed_window_skips_without_fetching() {
    let db = setup_db().await;
    let api = ScriptedApi::default().page(Resource::Development, ids(1..3));
    let notifier = RecordingNotifier::default();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    // 03:00 in São Paulo.
    let night = Utc
        .with_ymd_and_hms(2025, 6, 10, 6, 0, 0)
        .single()
        .expect("valid time");

    let outcome = engine(&db, &api, &notifier)
        .with_window(OperatingWindow::for_environment("production"))
        .with_progress(Box::new(move |event| {
            sink.lock().expect("lock").push(event);
        }))
        .run_full_sync_at(night)
        .await
        .expect("skip is not an error");

    assert!(matches!(outcome, SyncOutcome::Skipped { local_hour: 3 }));
    assert!(api.calls().is_empty());
    assert!(notifier.sent().is_empty());
    assert!(matches!(
        events.lock().expect("lock").as_slice(),
        [SyncProgress::OutsideWindow { hour: 3, .. }]
    ));
}

#[tokio::test]
async fn open_window_in_production_runs() {
    let db = setup_db().await;
    let api = ScriptedApi::default();
    // 10:00 in São Paulo.
    let morning = Utc
        .with_ymd_and_hms(2025, 6, 10, 13, 0, 0)
        .single()
        .expect("valid time");

    let outcome = engine(&db, &api, &RecordingNotifier::default())
        .with_window(OperatingWindow::for_environment("production"))
        .run_full_sync_at(morning)
        .await
        .expect("pass");

    assert!(matches!(outcome, SyncOutcome::Completed(_)));
    assert_eq!(api.fetched(Resource::Development), 1);
}

#[tokio::test]
async fn required_failure_aborts_and_notifies() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .page(Resource::Development, ids(1..3))
        .failure(
            Resource::Unit,
            FetchError::Status {
                status: 503,
                message: "unavailable".to_string(),
            },
        );
    let notifier = RecordingNotifier::default();

    let err = engine(&db, &api, &notifier)
        .run_full_sync()
        .await
        .expect_err("unit failure is fatal");

    match err {
        RunError::Resource(e) => {
            assert_eq!(e.resource, Resource::Unit);
            assert_eq!(e.page, 1);
            assert_eq!(e.records_written, 0);
            assert!(matches!(e.source, ResourceFailure::Fetch(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(api.fetched(Resource::Sale), 0);
    assert_eq!(Development::find().count(db.as_ref()).await.expect("count"), 2);
    match notifier.sent().as_slice() {
        [Notification::Failure { error, .. }] => assert!(error.contains("units"), "{error}"),
        other => panic!("expected one failure notification, got {other:?}"),
    }
}

#[tokio::test]
async fn secondary_failure_is_isolated() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .failure(Resource::Prosoluto, FetchError::Malformed("eof".to_string()))
        .page(Resource::Attendance, ids(1..3));
    let notifier = RecordingNotifier::default();

    let summary = completed(
        engine(&db, &api, &notifier)
            .run_full_sync()
            .await
            .expect("secondary failure is not fatal"),
    );

    let degraded: Vec<&str> = summary.degraded().map(|r| r.resource).collect();
    assert_eq!(degraded, vec!["prosoluto"]);
    assert_eq!(summary.written(Resource::Attendance), 2);
    assert_eq!(api.fetched(Resource::SaleCondition), 1);
    assert!(matches!(notifier.sent().as_slice(), [Notification::Success(_)]));
}

#[tokio::test]
async fn pages_before_a_failure_stay_committed() {
    let db = setup_db().await;
    let api = ScriptedApi::default()
        .page(Resource::Payout, ids(1..51))
        .failure(Resource::Payout, FetchError::Transport("connection reset".to_string()));

    let summary = completed(
        engine(&db, &api, &RecordingNotifier::default())
            .run_full_sync()
            .await
            .expect("pass"),
    );

    let report = summary
        .resources
        .iter()
        .find(|r| r.resource == "payouts")
        .expect("payouts report");
    assert_eq!(report.stats.written, 50);
    assert_eq!(report.stats.fetched, 50);
    assert_eq!(report.stats.pages, 1);
    assert_eq!(report.error.as_deref(), Some("Network error"));
    assert_eq!(Payout::find().count(db.as_ref()).await.expect("count"), 50);
}
