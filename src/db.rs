use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use time::{macros::format_description, OffsetDateTime};
use uuid::Uuid;

use crate::{RelayError, RelayResult};

/// Phone number keying an account. Immutable once registered.
pub type Identity = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub phone: Identity,
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// Partial account edit; `None` leaves the column as it is.
#[derive(Debug, Default, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Message {
    #[serde(skip)]
    pub id: String,
    pub sender: Identity,
    pub receiver: Identity,
    pub text: String,
    /// Server clock, unix milliseconds.
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub sender: Identity,
    pub text: String,
    pub time: String,
}

impl From<&Message> for DisplayRecord {
    fn from(msg: &Message) -> Self {
        DisplayRecord {
            sender: msg.sender.clone(),
            text: msg.text.clone(),
            time: display_time(msg.time),
        }
    }
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// `h:mm:ss AM` wall-clock rendering of a unix-millisecond timestamp.
pub fn display_time(millis: i64) -> String {
    let format = format_description!("[hour repr:12 padding:none]:[minute]:[second] [period]");
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
        .ok()
        .and_then(|at| at.format(format).ok())
        .unwrap_or_else(|| millis.to_string())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    phone TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    password TEXT NOT NULL,
    role TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY NOT NULL,
    sender TEXT NOT NULL,
    receiver TEXT NOT NULL,
    text TEXT NOT NULL,
    time INTEGER NOT NULL
);
"#;

/// Durable side of the relay: `users` keyed by phone, `messages` keyed by a
/// generated id. Every call is a single-key read or write.
#[derive(Clone)]
pub struct Store {
    db_pool: SqlitePool,
}

impl Store {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Store, sqlx::Error> {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&db_pool).await?;

        Ok(Store { db_pool })
    }

    pub async fn close(&self) {
        self.db_pool.close().await;
    }

    pub async fn insert_account(&self, account: &Account) -> RelayResult<()> {
        let result = sqlx::query("INSERT INTO users (phone,name,password,role) VALUES (?,?,?,?)")
            .bind(&account.phone)
            .bind(&account.name)
            .bind(&account.password)
            .bind(account.role)
            .execute(&self.db_pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(RelayError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_account(&self, phone: &str) -> RelayResult<Option<Account>> {
        Ok(
            sqlx::query_as("SELECT phone,name,password,role FROM users WHERE phone=?")
                .bind(phone)
                .fetch_optional(&self.db_pool)
                .await?
        )
    }

    pub async fn list_accounts(&self) -> RelayResult<Vec<Account>> {
        Ok(
            sqlx::query_as("SELECT phone,name,password,role FROM users ORDER BY phone")
                .fetch_all(&self.db_pool)
                .await?
        )
    }

    pub async fn update_account(&self, phone: &str, update: AccountUpdate) -> RelayResult<()> {
        let result = sqlx::query(
            "UPDATE users SET name=COALESCE(?,name), password=COALESCE(?,password), role=COALESCE(?,role) WHERE phone=?"
        )
            .bind(update.name)
            .bind(update.password)
            .bind(update.role)
            .bind(phone)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RelayError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_account(&self, phone: &str) -> RelayResult<()> {
        sqlx::query("DELETE FROM users WHERE phone=?")
            .bind(phone)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    pub async fn append_message(
        &self,
        sender: &str,
        receiver: &str,
        text: &str,
        time: i64,
    ) -> RelayResult<Message> {
        let id = Uuid::now_v7().to_string();
        sqlx::query("INSERT INTO messages (id,sender,receiver,text,time) VALUES (?,?,?,?,?)")
            .bind(&id)
            .bind(sender)
            .bind(receiver)
            .bind(text)
            .bind(time)
            .execute(&self.db_pool)
            .await?;

        Ok(Message {
            id,
            sender: sender.to_owned(),
            receiver: receiver.to_owned(),
            text: text.to_owned(),
            time,
        })
    }

    /// Every stored message, oldest insert first.
    pub async fn list_messages(&self) -> RelayResult<Vec<Message>> {
        Ok(
            sqlx::query_as("SELECT id,sender,receiver,text,time FROM messages ORDER BY rowid")
                .fetch_all(&self.db_pool)
                .await?
        )
    }

    pub async fn delete_message(&self, id: &str) -> RelayResult<()> {
        sqlx::query("DELETE FROM messages WHERE id=?")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }
}
