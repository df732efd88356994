use anyhow::Result;
use rusqlite::{Connection, Row};
use shop_types::models::Role;

use super::OptionalExt;
use super::profiles::{NewProfile, insert_profile};
use crate::Database;
use crate::models::UserRow;

const USER_COLUMNS: &str =
    "id, username, password_hash, name, phone, email, role, business_number, is_active, created_at";

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub role: Role,
    pub business_number: Option<&'a str>,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.with_conn(|conn| insert_user(conn, user))
    }

    /// Insert the account and, when given, its first business profile in one
    /// transaction. The profile becomes the user's main profile.
    pub fn create_user_with_profile(
        &self,
        user: &NewUser<'_>,
        profile: Option<&NewProfile<'_>>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            insert_user(&tx, user)?;
            if let Some(profile) = profile {
                insert_profile(&tx, profile, true)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &[username]))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &[id]))
    }

    pub fn find_user_by_name_and_phone(&self, name: &str, phone: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "name = ?1 AND phone = ?2", &[name, phone]))
    }

    pub fn phone_in_use(&self, phone: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM users WHERE phone = ?1", [phone], |r| r.get(0))?;
            Ok(count > 0)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
    }

    pub fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET password_hash = ?2 WHERE id = ?1", (id, password_hash))?;
            Ok(())
        })
    }

    /// Overwrite the contact fields that are `Some`; `None` keeps the stored value.
    pub fn update_user_contact(
        &self,
        id: &str,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    phone = COALESCE(?3, phone),
                    email = COALESCE(?4, email)
                 WHERE id = ?1",
                rusqlite::params![id, name, phone, email],
            )?;
            Ok(())
        })
    }

    /// Batch-fetch users for a set of ids.
    pub fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE id IN ({})",
                USER_COLUMNS,
                super::placeholders(1, ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(ids), map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insert_user(conn: &Connection, user: &NewUser<'_>) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, password_hash, name, phone, email, role, business_number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            user.id,
            user.username,
            user.password_hash,
            user.name,
            user.phone,
            user.email,
            user.role.as_str(),
            user.business_number,
        ],
    )?;
    Ok(())
}

fn query_user(conn: &Connection, condition: &str, params: &[&str]) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE {} LIMIT 1", USER_COLUMNS, condition);
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row(rusqlite::params_from_iter(params), map_user).optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        role: row.get(6)?,
        business_number: row.get(7)?,
        is_active: row.get(8)?,
        created_at: row.get(9)?,
    })
}
