use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use todos_server::todo::SeaOrmTodoStore;
use todos_server::todo::api::v1::TodoState;

/// Test context backed by a throwaway SQLite file.
pub struct TestContext {
    #[allow(dead_code)] // dir is kept so the database file outlives the test body
    pub dir: tempfile::TempDir,
    pub db: DatabaseConnection,
}

#[allow(dead_code)]
impl TestContext {
    pub fn store(&self) -> SeaOrmTodoStore {
        SeaOrmTodoStore::new(self.db.clone())
    }

    pub fn todo_state(&self) -> Arc<TodoState> {
        Arc::new(TodoState::new(Arc::new(self.store())))
    }
}

pub async fn setup_db(dir: &tempfile::TempDir) -> anyhow::Result<DatabaseConnection> {
    let db_path = dir.path().join("todos.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let dir = tempfile::tempdir()?;
    let db = setup_db(&dir).await?;
    Ok(TestContext { dir, db })
}
