//! End-to-end flow through the public API: configure, open, create, list,
//! authenticate, delete.

#![allow(clippy::unwrap_used)]

use pagebin_core::{
    Admission, CodeType, Config, Cookies, Db, Gate, Pages, RequestInfo, Session,
};

fn open_repo(dir: &tempfile::TempDir) -> Pages {
    let mut config = Config::default();
    config.store.path = dir.path().join("pages.db");
    let db = Db::open(&config.store.path, config.store.settings()).unwrap();
    Pages::new(db)
}

#[tokio::test]
async fn full_page_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir);

    let created = repo
        .create(
            "<html><head><title>Weekly Report</title></head><body><p>numbers</p></body></html>",
            true,
            CodeType::Html,
        )
        .await
        .unwrap();

    let page = repo.get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(page.title, "Weekly Report");
    assert!(page.is_protected);

    let recent = repo.get_recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, created.id);

    let list = repo.list_paged(1, 10, "Weekly").await.unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.pages[0].id, created.id);

    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.protected_count, 1);

    assert!(repo.delete_by_id(&created.id).await.unwrap());
    assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
    assert_eq!(repo.stats().await.unwrap().total, 0);
}

#[tokio::test]
async fn admission_gates_an_admin_flow() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir);
    let gate = Gate::new(true);

    let request = RequestInfo {
        path: "/api/admin/pages".to_string(),
        accept: Some("application/json".to_string()),
    };

    // Anonymous caller is turned away before touching the repository.
    let mut session = Session::default();
    let outcome = gate.admit_admin(&request, &mut session, &Cookies::default());
    assert!(matches!(outcome, Admission::Denied(r) if r.status == 401));

    // A cookie-restored admin session goes through and can operate.
    let cookies = Cookies {
        auth: Some("true".to_string()),
        role: Some("admin".to_string()),
    };
    let outcome = gate.admit_admin(&request, &mut session, &cookies);
    assert_eq!(outcome, Admission::Granted);

    let created = repo
        .create("<p>admin made this</p>", false, CodeType::Html)
        .await
        .unwrap();
    assert_eq!(repo.batch_delete(&[created.id]).await.unwrap(), 1);
}
