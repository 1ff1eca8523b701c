use std::sync::Arc;

use valoranl_storage_sqlite::db::{self, DbPool, WriteHandle};

/// A migrated temp-file database plus its writer actor. The temp directory
/// lives as long as this struct.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: tempfile::TempDir,
}

pub fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir
        .path()
        .join("valoranl.db")
        .to_str()
        .expect("temp path is not utf-8")
        .to_string();

    db::init(&db_path).expect("failed to initialize database");
    let pool = db::create_pool(&db_path).expect("failed to create pool");
    db::run_migrations(&pool).expect("failed to run migrations");
    let writer = db::spawn_writer((*pool).clone());

    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}
