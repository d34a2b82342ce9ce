//! Who may manage an event on personal calendars.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::{Event, EventManage};
use crate::user::User;

/// Site-wide personal management policy.
///
/// Stored settings use `open`, `closed` and `by_event`; the older `yes` and
/// `no` values are accepted as aliases, and an empty value means `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PersonalManage {
    #[default]
    Open,
    Closed,
    ByEvent,
}

impl PersonalManage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalManage::Open => "open",
            PersonalManage::Closed => "closed",
            PersonalManage::ByEvent => "by_event",
        }
    }
}

impl FromStr for PersonalManage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "open" | "yes" => Ok(PersonalManage::Open),
            "closed" | "no" => Ok(PersonalManage::Closed),
            "by_event" => Ok(PersonalManage::ByEvent),
            other => Err(format!("Unknown personal_manage policy '{other}'")),
        }
    }
}

impl TryFrom<String> for PersonalManage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PersonalManage> for String {
    fn from(policy: PersonalManage) -> Self {
        policy.as_str().to_string()
    }
}

/// Whether the acting user may manage an event on personal calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManageStatus {
    Open,
    Closed,
}

impl ManageStatus {
    pub fn is_open(&self) -> bool {
        *self == ManageStatus::Open
    }
}

impl fmt::Display for ManageStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ManageStatus::Open => write!(f, "open"),
            ManageStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Resolve the management status for `event` under `policy`.
///
/// When the policy restricts management, admins and the event owner still
/// get `Open`. Every other combination, including an anonymous user,
/// resolves to `Closed`.
pub fn resolve(policy: PersonalManage, event: &Event, acting: Option<&User>) -> ManageStatus {
    let unrestricted = match policy {
        PersonalManage::Open => true,
        PersonalManage::ByEvent => event.personal_manage != Some(EventManage::Closed),
        PersonalManage::Closed => false,
    };

    if unrestricted {
        return ManageStatus::Open;
    }

    match acting {
        Some(user) if user.admin || user.id == event.owner => ManageStatus::Open,
        _ => ManageStatus::Closed,
    }
}
