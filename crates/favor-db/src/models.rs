//! Database row types. These map directly to SQLite rows; conversion into the
//! `favor-types` API models happens here so handlers never see a password.

use favor_types::models::{Friend, Friendship, Notification, Offer, ServiceRequest, User};

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct RequestRow {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub category: String,
    pub location: String,
    pub price: f64,
    pub date_time: String,
}

/// Insert payload for a request. `date_time` must already be normalized.
pub struct NewRequest<'a> {
    pub description: &'a str,
    pub category: &'a str,
    pub location: &'a str,
    pub price: f64,
    pub date_time: &'a str,
}

#[derive(Debug)]
pub struct OfferRow {
    pub id: i64,
    pub request_id: i64,
    pub user_id: i64,
    pub price: f64,
    pub accepted: bool,
}

#[derive(Debug)]
pub struct FriendshipRow {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
}

#[derive(Debug)]
pub struct FriendRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub read: bool,
    pub timestamp: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

impl From<RequestRow> for ServiceRequest {
    fn from(row: RequestRow) -> Self {
        ServiceRequest {
            id: row.id,
            user_id: row.user_id,
            description: row.description,
            category: row.category,
            location: row.location,
            price: row.price,
            date_time: row.date_time,
        }
    }
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Offer {
            id: row.id,
            request_id: row.request_id,
            user_id: row.user_id,
            price: row.price,
            accepted: row.accepted,
        }
    }
}

impl From<FriendshipRow> for Friendship {
    fn from(row: FriendshipRow) -> Self {
        Friendship {
            id: row.id,
            user_id: row.user_id,
            friend_id: row.friend_id,
        }
    }
}

impl From<FriendRow> for Friend {
    fn from(row: FriendRow) -> Self {
        Friend {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            read: row.read,
            timestamp: row.timestamp,
        }
    }
}
