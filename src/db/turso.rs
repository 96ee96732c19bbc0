use crate::types::{AppError, Booking, HistoryEntry, Notification, Result};
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Builder, Connection, Database};

macro_rules! col {
    ($row:expr, $idx:expr) => {
        $row
            .get($idx)
            .map_err(|e| AppError::Database(e.to_string()))?
    };
    ($row:expr, $idx:expr, $ty:ty) => {
        $row
            .get::<$ty>($idx)
            .map_err(|e| AppError::Database(e.to_string()))?
    };
}

/// libsql-backed store for users, chat history, feedback, bookings and
/// notifications.
///
/// A single connection is held for the lifetime of the client: an
/// in-memory database only exists for the connection that created it.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Open (or create) a local database file, or `:memory:`.
    pub async fn new_local(path: &str) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Database(format!("Failed to create database directory: {}", e))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;
        client.seed_notifications().await?;

        Ok(client)
    }

    /// Fresh in-memory database, used by tests and `ask`.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                sender_id TEXT NOT NULL,
                user_message TEXT NOT NULL,
                bot_response TEXT NOT NULL,
                intent TEXT NOT NULL,
                confidence REAL NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create chat_messages table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_sender ON chat_messages(sender_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create chat index: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                sender_id TEXT NOT NULL,
                message_id TEXT NOT NULL,
                rating INTEGER NOT NULL,
                feedback TEXT,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create feedback table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                user_name TEXT NOT NULL,
                email TEXT NOT NULL,
                course_name TEXT NOT NULL,
                scheduled_at INTEGER NOT NULL,
                status TEXT NOT NULL,
                message TEXT,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create bookings table: {}", e)))?;

        // One confirmed booking per slot
        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_confirmed_slot
             ON bookings(scheduled_at) WHERE status = 'confirmed'",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create bookings index: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                kind TEXT NOT NULL,
                read INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create notifications table: {}", e)))?;

        Ok(())
    }

    async fn seed_notifications(&self) -> Result<()> {
        let conn = self.connection();
        conn.execute(
            "INSERT OR IGNORE INTO notifications (id, title, message, kind, read, created_at)
             VALUES ('1', 'Welcome', 'Welcome to ChatBotX!', 'info', 0, ?)",
            [Utc::now().timestamp()],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to seed notifications: {}", e)))?;

        Ok(())
    }

    // User operations
    pub async fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<()> {
        let conn = self.connection();
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
              VALUES (?, ?, ?, ?, ?, ?)",
            (id, email, password_hash, name, now, now),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create user: {}", e)))?;

        Ok(())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user("WHERE email = ?", email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.query_user("WHERE id = ?", id).await
    }

    async fn query_user(&self, filter: &str, value: &str) -> Result<Option<User>> {
        let conn = self.connection();
        let sql = format!(
            "SELECT id, email, password_hash, name, created_at, updated_at FROM users {}",
            filter
        );

        let mut rows = conn
            .query(&sql, [value])
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        if let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Ok(Some(User {
                id: col!(row, 0),
                email: col!(row, 1),
                password_hash: col!(row, 2),
                name: col!(row, 3),
                created_at: col!(row, 4),
                updated_at: col!(row, 5),
            }))
        } else {
            Ok(None)
        }
    }

    // Chat history operations
    pub async fn add_chat_message(&self, entry: &HistoryEntry) -> Result<()> {
        let conn = self.connection();

        conn.execute(
            "INSERT INTO chat_messages
             (id, sender_id, user_message, bot_response, intent, confidence, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                entry.id.as_str(),
                entry.sender_id.as_str(),
                entry.user_message.as_str(),
                entry.bot_response.as_str(),
                entry.intent.as_str(),
                entry.confidence as f64,
                entry.timestamp.timestamp_millis(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to add chat message: {}", e)))?;

        Ok(())
    }

    /// History for a sender in insertion order.
    pub async fn get_chat_history(&self, sender_id: &str) -> Result<Vec<HistoryEntry>> {
        let conn = self.connection();

        let mut rows = conn
            .query(
                "SELECT id, sender_id, user_message, bot_response, intent, confidence, timestamp
                 FROM chat_messages WHERE sender_id = ? ORDER BY rowid ASC",
                [sender_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query chat history: {}", e)))?;

        let mut history = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            history.push(HistoryEntry {
                id: col!(row, 0),
                sender_id: col!(row, 1),
                user_message: col!(row, 2),
                bot_response: col!(row, 3),
                intent: col!(row, 4),
                confidence: col!(row, 5, f64) as f32,
                timestamp: from_millis(col!(row, 6, i64))?,
            });
        }

        Ok(history)
    }

    /// Delete a sender's history, returning the number of removed rows.
    pub async fn delete_chat_history(&self, sender_id: &str) -> Result<u64> {
        let conn = self.connection();

        conn.execute("DELETE FROM chat_messages WHERE sender_id = ?", [sender_id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete chat history: {}", e)))
    }

    // Feedback operations
    pub async fn store_feedback(
        &self,
        sender_id: &str,
        message_id: &str,
        rating: u8,
        feedback: Option<&str>,
    ) -> Result<String> {
        let conn = self.connection();
        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO feedback (id, sender_id, message_id, rating, feedback, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.as_str(),
                sender_id,
                message_id,
                rating as i64,
                feedback,
                Utc::now().timestamp(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to store feedback: {}", e)))?;

        Ok(id)
    }

    // Booking operations

    /// Insert a booking. Returns `false` when its slot already holds a
    /// confirmed booking.
    pub async fn create_booking(&self, booking: &Booking) -> Result<bool> {
        let conn = self.connection();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO bookings
                 (id, user_name, email, course_name, scheduled_at, status, message, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    booking.id.as_str(),
                    booking.user_name.as_str(),
                    booking.email.as_str(),
                    booking.course_name.as_str(),
                    booking.scheduled_at.timestamp(),
                    booking.status.as_str(),
                    booking.message.as_deref(),
                    booking.created_at.timestamp(),
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create booking: {}", e)))?;

        Ok(inserted == 1)
    }

    pub async fn get_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>> {
        self.query_bookings(
            "WHERE lower(email) = lower(?) ORDER BY scheduled_at ASC",
            [email],
        )
        .await
    }

    /// Confirmed bookings whose slot falls on `date` (UTC).
    pub async fn get_bookings_on(&self, date: NaiveDate) -> Result<Vec<Booking>> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc().timestamp())
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid date: {}", date)))?;
        let end = start + 86_400;

        self.query_bookings(
            "WHERE scheduled_at >= ? AND scheduled_at < ? AND status = 'confirmed'
             ORDER BY scheduled_at ASC",
            [start, end],
        )
        .await
    }

    async fn query_bookings(
        &self,
        filter: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Booking>> {
        let conn = self.connection();
        let sql = format!(
            "SELECT id, user_name, email, course_name, scheduled_at, status, message, created_at
             FROM bookings {}",
            filter
        );

        let mut rows = conn
            .query(&sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query bookings: {}", e)))?;

        let mut bookings = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            bookings.push(Booking {
                id: col!(row, 0),
                user_name: col!(row, 1),
                email: col!(row, 2),
                course_name: col!(row, 3),
                scheduled_at: from_secs(col!(row, 4, i64))?,
                status: col!(row, 5),
                message: col!(row, 6),
                created_at: from_secs(col!(row, 7, i64))?,
            });
        }

        Ok(bookings)
    }

    // Notification operations
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        let conn = self.connection();

        let mut rows = conn
            .query(
                "SELECT id, title, message, kind, read FROM notifications ORDER BY created_at ASC, id ASC",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query notifications: {}", e)))?;

        let mut notifications = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            notifications.push(Notification {
                id: col!(row, 0),
                title: col!(row, 1),
                message: col!(row, 2),
                kind: col!(row, 3),
                read: col!(row, 4, i64) != 0,
            });
        }

        Ok(notifications)
    }

    pub async fn add_notification(&self, title: &str, message: &str, kind: &str) -> Result<String> {
        let conn = self.connection();
        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO notifications (id, title, message, kind, read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
            (id.as_str(), title, message, kind, Utc::now().timestamp()),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to add notification: {}", e)))?;

        Ok(id)
    }

    /// Returns `false` when no notification has that id.
    pub async fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let conn = self.connection();

        let changed = conn
            .execute("UPDATE notifications SET read = 1 WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark notification: {}", e)))?;

        Ok(changed > 0)
    }

    /// Cheap round trip used by the health endpoints.
    pub async fn ping(&self) -> bool {
        self.connection().query("SELECT 1", ()).await.is_ok()
    }
}

fn from_secs(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp: {}", secs)))
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp: {}", millis)))
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(sender: &str, text: &str) -> HistoryEntry {
        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender.to_string(),
            user_message: text.to_string(),
            bot_response: format!("reply to {}", text),
            intent: "greeting".to_string(),
            confidence: 1.0,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_user_roundtrip() {
        let db = TursoClient::new_memory().await.unwrap();
        db.create_user("u1", "a@example.com", "hash", "Ada").await.unwrap();

        let by_email = db.get_user_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, "u1");
        let by_id = db.get_user_by_id("u1").await.unwrap().unwrap();
        assert_eq!(by_id.name, "Ada");
        assert!(db.get_user_by_id("nope").await.unwrap().is_none());

        // Duplicate e-mail violates the unique constraint
        assert!(db.create_user("u2", "a@example.com", "h", "B").await.is_err());
    }

    #[tokio::test]
    async fn test_chat_history_order_and_delete() {
        let db = TursoClient::new_memory().await.unwrap();
        for text in ["one", "two", "three"] {
            db.add_chat_message(&entry("s1", text)).await.unwrap();
        }
        db.add_chat_message(&entry("s2", "other")).await.unwrap();

        let history = db.get_chat_history("s1").await.unwrap();
        let texts: Vec<&str> = history.iter().map(|h| h.user_message.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);

        assert_eq!(db.delete_chat_history("s1").await.unwrap(), 3);
        assert!(db.get_chat_history("s1").await.unwrap().is_empty());
        assert_eq!(db.get_chat_history("s2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bookings_by_date_and_email() {
        let db = TursoClient::new_memory().await.unwrap();
        let day = NaiveDate::from_ymd_opt(2030, 5, 6).unwrap();
        let at = Utc.with_ymd_and_hms(2030, 5, 6, 10, 0, 0).unwrap();

        let booking = Booking {
            id: "BOOK-1".to_string(),
            user_name: "Sam".to_string(),
            email: "Sam@Example.com".to_string(),
            course_name: "CS101".to_string(),
            scheduled_at: at,
            status: "confirmed".to_string(),
            message: None,
            created_at: Utc::now(),
        };
        assert!(db.create_booking(&booking).await.unwrap());

        let on_day = db.get_bookings_on(day).await.unwrap();
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].scheduled_at, at);

        let next_day = db.get_bookings_on(day + Duration::days(1)).await.unwrap();
        assert!(next_day.is_empty());

        let mine = db.get_bookings_by_email("sam@example.com").await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_slot_is_unique() {
        let db = TursoClient::new_memory().await.unwrap();
        let at = Utc.with_ymd_and_hms(2030, 5, 6, 11, 0, 0).unwrap();
        let booking = |id: &str, status: &str| Booking {
            id: id.to_string(),
            user_name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            course_name: "CS101".to_string(),
            scheduled_at: at,
            status: status.to_string(),
            message: None,
            created_at: Utc::now(),
        };

        assert!(db.create_booking(&booking("BOOK-1", "confirmed")).await.unwrap());
        assert!(!db.create_booking(&booking("BOOK-2", "confirmed")).await.unwrap());
        assert!(db.create_booking(&booking("BOOK-3", "cancelled")).await.unwrap());

        let day = at.date_naive();
        assert_eq!(db.get_bookings_on(day).await.unwrap().len(), 1);
        assert_eq!(db.get_bookings_by_email("sam@example.com").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_notifications_seed_and_mark_read() {
        let db = TursoClient::new_memory().await.unwrap();
        let notifications = db.list_notifications().await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Welcome");
        assert!(!notifications[0].read);

        assert!(db.mark_notification_read("1").await.unwrap());
        assert!(!db.mark_notification_read("missing").await.unwrap());
        assert!(db.list_notifications().await.unwrap()[0].read);
    }

    #[tokio::test]
    async fn test_feedback_and_ping() {
        let db = TursoClient::new_memory().await.unwrap();
        let id = db.store_feedback("s1", "m1", 5, Some("great")).await.unwrap();
        assert!(!id.is_empty());
        assert!(db.ping().await);
    }
}
