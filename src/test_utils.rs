pub mod test_helpers {
    use crate::config::AppConfig;
    use crate::models::Role;
    use crate::services::MockEmailService;
    use crate::AppState;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough";

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Insert a test user with hashed password. National ID and phone are
    /// derived from the email so several users can coexist.
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        role: Role,
        verified: bool,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let seed: u64 = email.bytes().fold(7u64, |acc, b| {
            acc.wrapping_mul(31).wrapping_add(b as u64)
        });
        let national_id = format!("{:014}", seed % 100_000_000_000_000);
        let phone = format!("010{:08}", seed % 100_000_000);
        let name = email.split('@').next().unwrap_or(email).to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO users
                (name, country, phone, national_id, email, password_hash, role, email_verified)
            VALUES (?, 'مصر', ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(national_id)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(verified)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a catalog service directly.
    pub async fn insert_test_service(
        pool: &SqlitePool,
        title: &str,
        price: f64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO services (title, description, duration_days, price) VALUES (?, ?, 30, ?)",
        )
        .bind(title)
        .bind(format!("وصف {}", title))
        .bind(price)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Configuration pointing uploads at `contracts_dir`.
    pub fn test_config(contracts_dir: &Path) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_ttl_hours: 1,
            base_url: "http://localhost:8080".to_string(),
            admin_email: "admin@taalim.test".to_string(),
            contracts_dir: contracts_dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    /// Everything a router test needs: the state, the mock outbox to
    /// inspect sent mail, and the upload directory (removed on drop).
    pub struct TestApp {
        pub state: AppState,
        pub email: Arc<MockEmailService>,
        pub contracts_dir: TempDir,
    }

    pub async fn create_test_app() -> Result<TestApp, Box<dyn std::error::Error>> {
        let pool = create_test_db().await?;
        let contracts_dir = TempDir::new()?;
        let config = test_config(contracts_dir.path());
        let email = Arc::new(MockEmailService::new(
            config.base_url.clone(),
            config.admin_email.clone(),
        ));
        let state = AppState::new(pool, config, email.clone());

        Ok(TestApp {
            state,
            email,
            contracts_dir,
        })
    }
}
