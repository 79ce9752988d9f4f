// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    db::store::IdentityStore,
    models::auth::{NewAccount, User, UserAccount, Workspace},
};

// O repositório de usuários e consultórios (tabelas 'users' e 'workspaces')
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_user<'e, E>(&self, executor: E, account: &NewAccount) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // workspace_id fica NULL: o consultório ainda não existe.
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    async fn insert_workspace<'e, E>(
        &self,
        executor: E,
        account: &NewAccount,
        owner_id: Uuid,
    ) -> Result<Workspace, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name, document_type, document_number, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&account.workspace_name)
        .bind(account.document_type)
        .bind(&account.document_number)
        .bind(owner_id)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    async fn link_user_to_workspace<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET workspace_id = $1, updated_at = now()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(user)
    }

    async fn find_workspace_by_id(&self, id: Uuid) -> Result<Option<Workspace>, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(workspace)
    }
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    // Busca um usuário pelo seu ID
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let Some(user) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let workspace = match user.workspace_id {
            Some(workspace_id) => self.find_workspace_by_id(workspace_id).await?,
            None => None,
        };

        Ok(Some(UserAccount { user, workspace }))
    }

    async fn find_workspace_for_user(&self, user_id: Uuid) -> Result<Option<Workspace>, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT w.*
            FROM workspaces w
            INNER JOIN users u ON u.workspace_id = w.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(workspace)
    }

    async fn create_account(&self, account: NewAccount) -> Result<(User, Workspace), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 1. Usuário sem consultório
        let user = self.insert_user(&mut *tx, &account).await?;

        // 2. Consultório com o usuário como dono
        let workspace = self.insert_workspace(&mut *tx, &account, user.id).await?;

        // 3. Vincula o usuário ao consultório.
        // Qualquer '?' acima descarta o `tx`, e o drop faz rollback.
        let user = self.link_user_to_workspace(&mut *tx, user.id, workspace.id).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok((user, workspace))
    }
}
