//! Request and response bodies for the booking backend.
//!
//! One typed struct per endpoint payload; nothing is sent as a loose map.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use barberbook_core::{Email, User};

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// `POST /auth/login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// `POST /auth/register` body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub phone: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Response of login and registration.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// A page of results from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

const fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// A single page holding every item.
    #[must_use]
    pub fn of(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            data,
            total: len as u64,
            page: 1,
            limit: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Query for `GET /bookings/time-slots`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimeSlotQuery<'a> {
    pub barbershop_id: &'a str,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<&'a str>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_serializes_password() {
        let request = LoginRequest {
            email: Email::parse("client@barber.uz").unwrap(),
            password: SecretString::from("s3cret-Pass"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "s3cret-Pass");
        assert!(!format!("{request:?}").contains("s3cret-Pass"));
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<u32> = serde_json::from_str(r#"{"data":[1,2,3]}"#).unwrap();
        assert_eq!(page.data, [1, 2, 3]);
        assert_eq!(page.page, 1);
    }
}
