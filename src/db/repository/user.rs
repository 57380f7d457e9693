use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::UserType;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, username, email, full_name, user_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.full_name,
            user.user_type.as_str(),
            user.created_at.format(crate::db::DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, username, email, full_name, user_type, created_at
             FROM users WHERE id = ?1",
            params![id.to_string()],
            user_row_from_rusqlite,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, username, email, full_name, user_type, created_at
             FROM users WHERE username = ?1",
            params![username],
            user_row_from_rusqlite,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, username, email, full_name, user_type, created_at
             FROM users WHERE email = ?1",
            params![email],
            user_row_from_rusqlite,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

/// Users of the given type, ordered by full name.
pub fn get_users_by_type(
    conn: &Connection,
    user_type: UserType,
) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, full_name, user_type, created_at
         FROM users WHERE user_type = ?1 ORDER BY full_name",
    )?;
    let rows = stmt.query_map(params![user_type.as_str()], user_row_from_rusqlite)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

/// Fails with `NotFound` unless `id` names a user of the expected type.
pub fn require_user_type(
    conn: &Connection,
    id: &Uuid,
    expected: UserType,
) -> Result<(), DatabaseError> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT user_type FROM users WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match stored.as_deref().map(UserType::from_str).transpose()? {
        Some(found) if found == expected => Ok(()),
        _ => Err(DatabaseError::not_found(capitalized(expected.as_str()).as_str(), id)),
    }
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct UserRow {
    id: String,
    username: String,
    email: Option<String>,
    full_name: String,
    user_type: String,
    created_at: String,
}

fn user_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        user_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        username: row.username,
        email: row.email,
        full_name: row.full_name,
        user_type: UserType::from_str(&row.user_type)?,
        created_at: parse_datetime(&row.created_at)?,
    })
}
