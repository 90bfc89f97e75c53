use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::models::{
    FriendRow, FriendshipRow, NewRequest, NotificationRow, OfferRow, RequestRow, UserRow,
};
use crate::{Database, DbResult};

/// Result of trying to accept an offer on behalf of a caller.
#[derive(Debug)]
pub enum AcceptOutcome {
    Accepted(OfferRow),
    /// The caller does not own the request the offer was made against.
    NotRequestOwner,
    Missing,
}

impl Database {
    // -- Users --

    /// Insert a user and return its id. A taken name or email surfaces as
    /// `DbError::Duplicate` straight from the UNIQUE constraint.
    pub fn create_user(&self, name: &str, email: &str, password_hash: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password) VALUES (?1, ?2, ?3)",
                (name, email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, email, password FROM users WHERE email = ?1",
                [email],
                map_user,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, email, password FROM users WHERE id = ?1",
                [id],
                map_user,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Overwrite name and email, and the password hash when one is given.
    /// Returns `false` if no such user exists.
    pub fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = match password_hash {
                Some(hash) => conn.execute(
                    "UPDATE users SET name = ?2, email = ?3, password = ?4 WHERE id = ?1",
                    params![id, name, email, hash],
                )?,
                None => conn.execute(
                    "UPDATE users SET name = ?2, email = ?3 WHERE id = ?1",
                    params![id, name, email],
                )?,
            };
            Ok(changed > 0)
        })
    }

    /// Delete a user. Requests, offers, friendship edges in both directions
    /// and notifications go with it through `ON DELETE CASCADE`.
    pub fn delete_user(&self, id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Requests --

    /// Persist a request and fan out one notification per outgoing friendship
    /// edge of its owner, atomically. Returns the stored row and how many
    /// notifications were written.
    pub fn create_request_with_fanout(
        &self,
        user_id: i64,
        req: &NewRequest<'_>,
        notification_message: &str,
    ) -> DbResult<(RequestRow, usize)> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO requests (user_id, description, category, location, price, date_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    req.description,
                    req.category,
                    req.location,
                    req.price,
                    req.date_time
                ],
            )?;
            let request_id = tx.last_insert_rowid();

            let notified = tx.execute(
                "INSERT INTO notifications (user_id, message)
                 SELECT friend_id, ?2 FROM friendships WHERE user_id = ?1 ORDER BY id",
                params![user_id, notification_message],
            )?;

            let row = tx.query_row(
                "SELECT id, user_id, description, category, location, price, date_time
                 FROM requests WHERE id = ?1",
                [request_id],
                map_request,
            )?;

            Ok((row, notified))
        })
    }

    /// Requests owned by anyone `user_id` has an outgoing edge to. Duplicate
    /// edges do not duplicate results.
    pub fn list_friend_requests(&self, user_id: i64) -> DbResult<Vec<RequestRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, description, category, location, price, date_time
                 FROM requests
                 WHERE user_id IN (SELECT friend_id FROM friendships WHERE user_id = ?1)
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], map_request)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Offers --

    /// A missing request surfaces as `DbError::MissingReference`.
    pub fn create_offer(&self, request_id: i64, user_id: i64, price: f64) -> DbResult<OfferRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO offers (request_id, user_id, price) VALUES (?1, ?2, ?3)",
                params![request_id, user_id, price],
            )?;
            let id = conn.last_insert_rowid();
            query_offer(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows.into())
        })
    }

    pub fn list_offers(&self, request_id: i64) -> DbResult<Vec<OfferRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, request_id, user_id, price, accepted
                 FROM offers WHERE request_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([request_id], map_offer)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mark an offer accepted if `caller_id` owns the request it targets.
    /// Accepting twice is a no-op that still reports `Accepted`.
    pub fn accept_offer(&self, offer_id: i64, caller_id: i64) -> DbResult<AcceptOutcome> {
        self.with_tx(|tx| {
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT r.user_id FROM offers o JOIN requests r ON o.request_id = r.id
                     WHERE o.id = ?1",
                    [offer_id],
                    |row| row.get(0),
                )
                .optional()?;

            match owner {
                None => Ok(AcceptOutcome::Missing),
                Some(owner) if owner != caller_id => Ok(AcceptOutcome::NotRequestOwner),
                Some(_) => {
                    tx.execute("UPDATE offers SET accepted = 1 WHERE id = ?1", [offer_id])?;
                    match query_offer(tx, offer_id)? {
                        Some(row) => Ok(AcceptOutcome::Accepted(row)),
                        None => Ok(AcceptOutcome::Missing),
                    }
                }
            }
        })
    }

    // -- Friendships --

    /// Insert the edge `user_id -> friend_id`. No reciprocal edge is created
    /// and duplicates are allowed; an unknown `friend_id` is rejected by the
    /// foreign key as `DbError::MissingReference`.
    pub fn create_friendship(&self, user_id: i64, friend_id: i64) -> DbResult<FriendshipRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO friendships (user_id, friend_id) VALUES (?1, ?2)",
                params![user_id, friend_id],
            )?;
            Ok(FriendshipRow {
                id: conn.last_insert_rowid(),
                user_id,
                friend_id,
            })
        })
    }

    /// One entry per outgoing edge, in edge creation order.
    pub fn list_friends(&self, user_id: i64) -> DbResult<Vec<FriendRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.name FROM friendships f
                 JOIN users u ON f.friend_id = u.id
                 WHERE f.user_id = ?1
                 ORDER BY f.id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(FriendRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Notifications --

    /// Newest first. Rows written in the same second fall back to id order.
    pub fn list_notifications(&self, user_id: i64) -> DbResult<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, message, read, timestamp
                 FROM notifications WHERE user_id = ?1
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(NotificationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        message: row.get(2)?,
                        read: row.get(3)?,
                        timestamp: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns `false` when the notification does not exist or is addressed
    /// to someone else.
    pub fn mark_notification_read(&self, id: i64, user_id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET read = 1 WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_offer(conn: &Connection, id: i64) -> DbResult<Option<OfferRow>> {
    conn.query_row(
        "SELECT id, request_id, user_id, price, accepted FROM offers WHERE id = ?1",
        [id],
        map_offer,
    )
    .optional()
    .map_err(Into::into)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
    })
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        location: row.get(4)?,
        price: row.get(5)?,
        date_time: row.get(6)?,
    })
}

fn map_offer(row: &Row<'_>) -> rusqlite::Result<OfferRow> {
    Ok(OfferRow {
        id: row.get(0)?,
        request_id: row.get(1)?,
        user_id: row.get(2)?,
        price: row.get(3)?,
        accepted: row.get(4)?,
    })
}
