use sqlx::PgPool;

use crate::{error::Result, models::Customer};

pub async fn get_all_customers(pool: &PgPool) -> Result<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(
        "SELECT id, email, phone_number, address, is_deleted, created_date
         FROM users
         WHERE is_deleted = false
         ORDER BY created_date DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn soft_deleted_customers_are_hidden(pool: PgPool) {
        sqlx::query(
            "INSERT INTO users (email, phone_number, is_deleted)
             VALUES ('kept@example.com', '555-0101', false),
                    ('gone@example.com', '555-0102', true)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let customers = get_all_customers(&pool).await.unwrap();
        let emails: Vec<&str> = customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["kept@example.com"]);
    }
}
