use sqlx::PgConnection;

use crate::models::user::{Role, User};

pub async fn fetch_active_driver(conn: &mut PgConnection, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"SELECT id, username, role, is_active, created_at
           FROM users
           WHERE id = $1 AND role = $2 AND is_active"#,
    )
    .bind(user_id)
    .bind(Role::Driver.as_str())
    .fetch_optional(&mut *conn)
    .await
}
