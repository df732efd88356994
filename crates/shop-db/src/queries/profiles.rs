use anyhow::Result;
use rusqlite::{Connection, Row};
use shop_types::models::ApprovalStatus;

use super::OptionalExt;
use crate::Database;
use crate::models::BusinessProfileRow;

const PROFILE_COLUMNS: &str = "id, user_id, business_name, business_number, representative_name,
    office_address, storage_address, status, is_main, rejection_reason, approved_at, approved_by,
    created_at";

pub struct NewProfile<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub business_name: &'a str,
    pub business_number: &'a str,
    pub representative_name: Option<&'a str>,
    pub office_address: Option<&'a str>,
    pub storage_address: Option<&'a str>,
}

impl Database {
    // -- Business profiles --

    /// Add a pending profile. It becomes the main profile only when the user
    /// has none yet. Returns whether it was made main.
    pub fn create_profile(&self, profile: &NewProfile<'_>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let has_main: i64 = tx.query_row(
                "SELECT COUNT(*) FROM business_profiles WHERE user_id = ?1 AND is_main = 1",
                [profile.user_id],
                |r| r.get(0),
            )?;
            let is_main = has_main == 0;
            insert_profile(&tx, profile, is_main)?;
            tx.commit()?;
            Ok(is_main)
        })
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<BusinessProfileRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM business_profiles WHERE id = ?1", PROFILE_COLUMNS);
            conn.query_row(&sql, [id], map_profile).optional()
        })
    }

    pub fn get_main_profile(&self, user_id: &str) -> Result<Option<BusinessProfileRow>> {
        self.with_conn(|conn| query_main_profile(conn, user_id))
    }

    /// All profiles of a user, main profile first.
    pub fn list_profiles_for_user(&self, user_id: &str) -> Result<Vec<BusinessProfileRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM business_profiles WHERE user_id = ?1
                 ORDER BY is_main DESC, created_at, rowid",
                PROFILE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_profile)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_profiles_by_status(&self, status: ApprovalStatus) -> Result<Vec<BusinessProfileRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM business_profiles WHERE status = ?1 ORDER BY created_at, rowid",
                PROFILE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status.as_str()], map_profile)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Make `profile_id` the user's only main profile. Returns false when the
    /// profile does not belong to the user.
    pub fn set_main_profile(&self, user_id: &str, profile_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let owned: i64 = tx.query_row(
                "SELECT COUNT(*) FROM business_profiles WHERE id = ?1 AND user_id = ?2",
                [profile_id, user_id],
                |r| r.get(0),
            )?;
            if owned == 0 {
                return Ok(false);
            }

            // Clear first so the partial unique index never sees two mains
            tx.execute(
                "UPDATE business_profiles SET is_main = 0 WHERE user_id = ?1 AND is_main = 1",
                [user_id],
            )?;
            tx.execute("UPDATE business_profiles SET is_main = 1 WHERE id = ?1", [profile_id])?;
            tx.commit()?;
            Ok(true)
        })
    }

    /// Update business fields on the main profile. Returns false when the user
    /// has no main profile.
    pub fn update_main_profile(
        &self,
        user_id: &str,
        business_name: Option<&str>,
        office_address: Option<&str>,
        storage_address: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE business_profiles SET
                    business_name = COALESCE(?2, business_name),
                    office_address = COALESCE(?3, office_address),
                    storage_address = COALESCE(?4, storage_address)
                 WHERE user_id = ?1 AND is_main = 1",
                rusqlite::params![user_id, business_name, office_address, storage_address],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn approve_profile(&self, id: &str, approver_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE business_profiles SET
                    status = 'approved',
                    rejection_reason = NULL,
                    approved_at = datetime('now'),
                    approved_by = ?2
                 WHERE id = ?1",
                (id, approver_id),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn reject_profile(&self, id: &str, reason: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE business_profiles SET
                    status = 'rejected',
                    rejection_reason = ?2,
                    approved_at = NULL,
                    approved_by = NULL
                 WHERE id = ?1",
                rusqlite::params![id, reason],
            )?;
            Ok(changed > 0)
        })
    }
}

pub(super) fn insert_profile(conn: &Connection, profile: &NewProfile<'_>, is_main: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO business_profiles
            (id, user_id, business_name, business_number, representative_name,
             office_address, storage_address, is_main)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            profile.id,
            profile.user_id,
            profile.business_name,
            profile.business_number,
            profile.representative_name,
            profile.office_address,
            profile.storage_address,
            is_main,
        ],
    )?;
    Ok(())
}

fn query_main_profile(conn: &Connection, user_id: &str) -> Result<Option<BusinessProfileRow>> {
    let sql = format!(
        "SELECT {} FROM business_profiles WHERE user_id = ?1 AND is_main = 1",
        PROFILE_COLUMNS
    );
    conn.query_row(&sql, [user_id], map_profile).optional()
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<BusinessProfileRow> {
    Ok(BusinessProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        business_name: row.get(2)?,
        business_number: row.get(3)?,
        representative_name: row.get(4)?,
        office_address: row.get(5)?,
        storage_address: row.get(6)?,
        status: row.get(7)?,
        is_main: row.get(8)?,
        rejection_reason: row.get(9)?,
        approved_at: row.get(10)?,
        approved_by: row.get(11)?,
        created_at: row.get(12)?,
    })
}
