use anyhow::Result;
use rusqlite::Row;
use shop_types::models::ApprovalStatus;

use super::OptionalExt;
use crate::Database;
use crate::models::{BusinessLicenseRow, RegistrationRequestRow};

const REGISTRATION_COLUMNS: &str = "id, email, phone, business_license_image, bank_statement_image,
    business_number, bank_name, bank_account_number, notes, status, created_at";

const LICENSE_COLUMNS: &str = "id, user_id, file_url, status, created_at";

pub struct NewRegistration<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub business_license_image: Option<&'a str>,
    pub bank_statement_image: Option<&'a str>,
    pub business_number: Option<&'a str>,
    pub bank_name: Option<&'a str>,
    pub bank_account_number: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl Database {
    // -- Registration requests --

    pub fn create_registration_request(&self, req: &NewRegistration<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO registration_requests
                    (id, email, phone, business_license_image, bank_statement_image,
                     business_number, bank_name, bank_account_number, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    req.id,
                    req.email,
                    req.phone,
                    req.business_license_image,
                    req.bank_statement_image,
                    req.business_number,
                    req.bank_name,
                    req.bank_account_number,
                    req.notes,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_registration_request(&self, id: &str) -> Result<Option<RegistrationRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM registration_requests WHERE id = ?1", REGISTRATION_COLUMNS);
            conn.query_row(&sql, [id], map_registration).optional()
        })
    }

    /// Newest first; `None` lists every status.
    pub fn list_registration_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<RegistrationRequestRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM registration_requests
                 WHERE ?1 IS NULL OR status = ?1
                 ORDER BY created_at DESC, rowid DESC",
                REGISTRATION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status.map(|s| s.as_str())], map_registration)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_registration_status(&self, id: &str, status: ApprovalStatus) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE registration_requests SET status = ?2 WHERE id = ?1",
                (id, status.as_str()),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Business licenses --

    pub fn create_license(&self, id: &str, user_id: &str, file_url: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO business_licenses (id, user_id, file_url) VALUES (?1, ?2, ?3)",
                (id, user_id, file_url),
            )?;
            Ok(())
        })
    }

    pub fn get_license(&self, id: &str) -> Result<Option<BusinessLicenseRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM business_licenses WHERE id = ?1", LICENSE_COLUMNS);
            conn.query_row(&sql, [id], map_license).optional()
        })
    }

    pub fn list_licenses_for_user(&self, user_id: &str) -> Result<Vec<BusinessLicenseRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM business_licenses
                 WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
                LICENSE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_license)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_license_status(&self, id: &str, status: ApprovalStatus) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE business_licenses SET status = ?2 WHERE id = ?1",
                (id, status.as_str()),
            )?;
            Ok(changed > 0)
        })
    }
}

fn map_registration(row: &Row<'_>) -> rusqlite::Result<RegistrationRequestRow> {
    Ok(RegistrationRequestRow {
        id: row.get(0)?,
        email: row.get(1)?,
        phone: row.get(2)?,
        business_license_image: row.get(3)?,
        bank_statement_image: row.get(4)?,
        business_number: row.get(5)?,
        bank_name: row.get(6)?,
        bank_account_number: row.get(7)?,
        notes: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn map_license(row: &Row<'_>) -> rusqlite::Result<BusinessLicenseRow> {
    Ok(BusinessLicenseRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        file_url: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
    })
}
