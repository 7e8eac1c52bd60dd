use crate::entities::todo;
use crate::todo::{NewTodo, Timestamp, Todo};
use async_trait::async_trait;
use sea_orm::*;

/// Error type for TodoStore operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No todo has the requested ID.
    #[error("Todo with ID {0} not found")]
    NotFound(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// A stored row could not be turned back into a todo.
    #[error("Todo with ID {id} is malformed: {reason}")]
    MalformedRecord { id: i32, reason: String },
}

/// Durable storage for todos.
///
/// Every HTTP handler performs exactly one call on this trait, so it is the seam
/// where tests substitute a mock to exercise failure paths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns every todo, oldest first.
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Persists a new todo and returns it with its assigned ID.
    async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// Returns the todo with the given ID, or `StoreError::NotFound`.
    async fn find_by_id(&self, id: i32) -> Result<Todo, StoreError>;

    /// Overwrites the stored todo that has the same ID.
    async fn save(&self, todo: Todo) -> Result<Todo, StoreError>;

    /// Removes the todo with the given ID and returns the number of rows removed (0 or 1).
    async fn delete_by_id(&self, id: i32) -> Result<u64, StoreError>;
}

/// `TodoStore` backed by a sea-orm connection, normally an SQLite file.
#[derive(Clone, Debug)]
pub struct SeaOrmTodoStore {
    db: DatabaseConnection,
}

impl SeaOrmTodoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TryFrom<todo::Model> for Todo {
    type Error = StoreError;

    fn try_from(model: todo::Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let parse = |value: &str| {
            value
                .parse::<Timestamp>()
                .map_err(|e| StoreError::MalformedRecord {
                    id,
                    reason: format!("invalid timestamp '{}': {}", value, e),
                })
        };

        let create_time = parse(model.create_time.as_str())?;
        let completed_time = model.completed_time.as_deref().map(parse).transpose()?;

        Ok(Todo::new(
            model.id,
            model.text,
            model.status,
            create_time,
            completed_time,
        ))
    }
}

#[async_trait]
impl TodoStore for SeaOrmTodoStore {
    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        todo::Entity::find()
            .order_by_asc(todo::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Todo::try_from)
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        let active_model = todo::ActiveModel {
            text: ActiveValue::Set(new_todo.text().to_string()),
            status: ActiveValue::Set(new_todo.status().to_string()),
            create_time: ActiveValue::Set(new_todo.create_time().to_string()),
            completed_time: ActiveValue::Set(None),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        tracing::info!("Created todo {}", created_model.id);
        Todo::try_from(created_model)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Todo, StoreError> {
        let model = todo::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        Todo::try_from(model)
    }

    #[tracing::instrument(skip(self))]
    async fn save(&self, todo: Todo) -> Result<Todo, StoreError> {
        let active_model = todo::ActiveModel {
            id: ActiveValue::Unchanged(todo.id()),
            text: ActiveValue::Set(todo.text().to_string()),
            status: ActiveValue::Set(todo.status().to_string()),
            create_time: ActiveValue::Set(todo.create_time().to_string()),
            completed_time: ActiveValue::Set(todo.completed_time().map(|t| t.to_string())),
        };
        let updated_model = match active_model.update(&self.db).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Err(StoreError::NotFound(todo.id())),
            Err(e) => return Err(e.into()),
        };
        Todo::try_from(updated_model)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: i32) -> Result<u64, StoreError> {
        let result = todo::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            tracing::info!("Deleted todo {}", id);
        }
        Ok(result.rows_affected)
    }
}
