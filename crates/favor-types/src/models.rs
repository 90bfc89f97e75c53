use serde::{Deserialize, Serialize};

/// Public view of a user. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A marketplace posting asking for a paid service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub category: String,
    pub location: String,
    pub price: f64,
    /// `YYYY-MM-DD HH:MM:SS`
    pub date_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub request_id: i64,
    pub user_id: i64,
    pub price: f64,
    pub accepted: bool,
}

/// Directed edge: `user_id` considers `friend_id` a friend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
}

/// Far end of a friendship edge, as returned by `GET /friends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub read: bool,
    /// UTC, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}
