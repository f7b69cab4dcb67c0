use sqlx::PgPool;

use crate::{error::Result, models::Admin};

pub async fn get_all_admins(pool: &PgPool) -> Result<Vec<Admin>> {
    let admins = sqlx::query_as::<_, Admin>("SELECT id, password_hash FROM admin")
        .fetch_all(pool)
        .await?;

    Ok(admins)
}
