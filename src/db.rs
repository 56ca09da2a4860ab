// src/db.rs

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, Transaction,
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::Config,
    models::{
        exam::{Exam, NewExam, SavedExam},
        question::{NewQuestion, Question},
    },
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Source of transactional sessions for writing exams.
#[async_trait]
pub trait ExamStore: Send + Sync {
    type Session: StoreSession;

    /// Opens a session with a transaction already started.
    async fn acquire_session(&self) -> Result<Self::Session, StoreError>;
}

/// One open transaction. Nothing written through it is visible to anyone
/// else until [`StoreSession::commit`]; dropping it uncommitted rolls back.
#[async_trait]
pub trait StoreSession: Send {
    /// Inserts the exam and returns its generated id.
    async fn insert_exam(&mut self, exam: &NewExam) -> Result<Uuid, StoreError>;

    async fn insert_question(
        &mut self,
        exam_id: Uuid,
        number: i32,
        question: &NewQuestion,
    ) -> Result<Uuid, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Pooled Postgres connection set.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Builds the pool without opening any connection yet.
    ///
    /// * `pool.size` connections are kept open, `pool.max_overflow` more may be opened under load.
    /// * Connections older than `pool.recycle` are replaced.
    /// * Every checkout is pinged first and waits at most `pool.timeout`.
    pub fn connect_lazy(config: &Config) -> Result<Self, StoreError> {
        let pool_config = &config.pool;

        let options = PgConnectOptions::from_str(&config.database_url)?
            .application_name(&pool_config.application_name)
            .statement_cache_capacity(0)
            .options([(
                "statement_timeout",
                pool_config.command_timeout.as_millis().to_string(),
            )]);

        let pool = PgPoolOptions::new()
            .min_connections(pool_config.size)
            .max_connections(pool_config.size + pool_config.max_overflow)
            .max_lifetime(pool_config.recycle)
            .test_before_acquire(true)
            .acquire_timeout(pool_config.timeout)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Round-trips a trivial query. Errors are logged and reported as `false`.
    pub async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Database health check failed: {:?}", e);
                false
            }
        }
    }

    /// Closes every pooled connection. Safe to call more than once.
    pub async fn shutdown(&self) {
        if self.pool.is_closed() {
            return;
        }
        tracing::info!("Closing database connections...");
        self.pool.close().await;
    }

    /// Reads a saved exam with its questions in order.
    pub async fn load_exam(&self, id: Uuid) -> Result<Option<SavedExam>, StoreError> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, exam_type, subject, year, title, duration, created_at
            FROM exams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(exam) = exam else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, exam_id, number, question, options, answer, explanation, verbose, created_at
            FROM questions
            WHERE exam_id = $1
            ORDER BY number
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SavedExam { exam, questions }))
    }
}

#[async_trait]
impl ExamStore for Database {
    type Session = PgSession;

    async fn acquire_session(&self) -> Result<PgSession, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgSession { tx })
    }
}

pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn insert_exam(&mut self, exam: &NewExam) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO exams (exam_type, subject, year, title, duration)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(exam.exam_type)
        .bind(&exam.subject)
        .bind(exam.year)
        .bind(&exam.title)
        .bind(exam.duration)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn insert_question(
        &mut self,
        exam_id: Uuid,
        number: i32,
        question: &NewQuestion,
    ) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO questions (exam_id, number, question, options, answer, explanation, verbose)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(exam_id)
        .bind(number)
        .bind(Json(&question.question))
        .bind(Json(&question.options))
        .bind(question.answer.as_str())
        .bind(Json(&question.explanation))
        .bind(question.verbose.as_ref().map(Json))
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
