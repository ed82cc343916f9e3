//!
//! # Conditions
//!
//! Ordered sequence of coarse status transitions. Each type appears at most once.
//!
//! Display tooling shows the first element as the resource status. That is a
//! convention of the print columns, nothing here keeps `Ready` in front;
//! callers that want a different headline can use
//! [`Conditions::most_recently_transitioned`] or [`Conditions::highest_severity`].
//!
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::Serialize;

pub const INIT_REASON: &str = "Init";
pub const READY_REASON: &str = "Ready";
pub const REQUESTED_REASON: &str = "Requested";
pub const ERROR_REASON: &str = "Error";

open_string_enum! {
    /// condition types set by the placement reconciler
    ConditionType {
        Ready => "Ready",
        InputReady => "InputReady",
        ServiceConfigReady => "ServiceConfigReady",
        DbReady => "DBReady",
        DbSyncReady => "DBSyncReady",
        ExposeServiceReady => "ExposeServiceReady",
        DeploymentReady => "DeploymentReady",
        KeystoneServiceReady => "KeystoneServiceReady",
        KeystoneEndpointReady => "KeystoneEndpointReady",
        NetworkAttachmentsReady => "NetworkAttachmentsReady",
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// how bad a non-True condition is
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    pub fn new(
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type,
            status,
            severity: None,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }

    /// ranks False by severity above Unknown above True
    fn badness(&self) -> u8 {
        match (self.status, self.severity) {
            (ConditionStatus::True, _) => 0,
            (ConditionStatus::Unknown, _) => 1,
            (ConditionStatus::False, None) => 2,
            (ConditionStatus::False, Some(Severity::Info)) => 3,
            (ConditionStatus::False, Some(Severity::Warning)) => 4,
            (ConditionStatus::False, Some(Severity::Error)) => 5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Condition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// add an Unknown condition for every type not yet present
    pub fn init(&mut self, types: impl IntoIterator<Item = ConditionType>) {
        let now = Utc::now();
        for condition_type in types {
            if self.get(&condition_type).is_none() {
                let message = format!("{} not started", condition_type);
                let mut condition =
                    Condition::new(condition_type, ConditionStatus::Unknown, INIT_REASON, message);
                condition.last_transition_time = now;
                self.0.push(condition);
            }
        }
    }

    pub fn set(&mut self, condition: Condition) {
        self.set_at(condition, Utc::now())
    }

    /// Insert or update by type.
    /// Same status: reason, message and severity are updated, the transition time is kept.
    /// Changed status or new type: the transition time becomes `now`.
    /// Position in the sequence is never changed by an update.
    pub fn set_at(&mut self, mut condition: Condition, now: DateTime<Utc>) {
        match self
            .0
            .iter_mut()
            .find(|c| c.condition_type == condition.condition_type)
        {
            Some(existing) if existing.status == condition.status => {
                existing.reason = condition.reason;
                existing.message = condition.message;
                existing.severity = condition.severity;
            }
            Some(existing) => {
                condition.last_transition_time = now;
                *existing = condition;
            }
            None => {
                condition.last_transition_time = now;
                self.0.push(condition);
            }
        }
    }

    pub fn mark_true(&mut self, condition_type: ConditionType, message: impl Into<String>) {
        self.set(Condition::new(
            condition_type,
            ConditionStatus::True,
            READY_REASON,
            message,
        ))
    }

    pub fn mark_false(
        &mut self,
        condition_type: ConditionType,
        reason: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) {
        self.set(
            Condition::new(condition_type, ConditionStatus::False, reason, message)
                .with_severity(severity),
        )
    }

    pub fn mark_unknown(
        &mut self,
        condition_type: ConditionType,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.set(Condition::new(
            condition_type,
            ConditionStatus::Unknown,
            reason,
            message,
        ))
    }

    pub fn get(&self, condition_type: &ConditionType) -> Option<&Condition> {
        self.0.iter().find(|c| &c.condition_type == condition_type)
    }

    pub fn remove(&mut self, condition_type: &ConditionType) -> Option<Condition> {
        let index = self
            .0
            .iter()
            .position(|c| &c.condition_type == condition_type)?;
        Some(self.0.remove(index))
    }

    pub fn is_true(&self, condition_type: &ConditionType) -> bool {
        self.status_of(condition_type) == Some(ConditionStatus::True)
    }

    pub fn is_false(&self, condition_type: &ConditionType) -> bool {
        self.status_of(condition_type) == Some(ConditionStatus::False)
    }

    /// absent conditions count as unknown
    pub fn is_unknown(&self, condition_type: &ConditionType) -> bool {
        matches!(
            self.status_of(condition_type),
            None | Some(ConditionStatus::Unknown)
        )
    }

    fn status_of(&self, condition_type: &ConditionType) -> Option<ConditionStatus> {
        self.get(condition_type).map(|c| c.status)
    }

    /// every condition other than `Ready` is True
    pub fn all_sub_conditions_true(&self) -> bool {
        self.0
            .iter()
            .filter(|c| c.condition_type != ConditionType::Ready)
            .all(Condition::is_true)
    }

    /// derive `Ready` from the sub conditions: True once they all are,
    /// otherwise a copy of the worst sub condition
    pub fn mirror_ready(&mut self, ready_message: impl Into<String>) {
        if self.all_sub_conditions_true() {
            self.mark_true(ConditionType::Ready, ready_message);
            return;
        }

        let worst = self
            .0
            .iter()
            .filter(|c| c.condition_type != ConditionType::Ready)
            .fold(None::<&Condition>, |worst, c| match worst {
                Some(w) if w.badness() >= c.badness() => Some(w),
                _ => Some(c),
            })
            .cloned();

        if let Some(worst) = worst {
            let mut ready = Condition::new(
                ConditionType::Ready,
                worst.status,
                worst.reason,
                worst.message,
            );
            ready.severity = worst.severity;
            self.set(ready);
        }
    }

    /// first element, the headline used by the print columns
    pub fn headline(&self) -> Option<&Condition> {
        self.0.first()
    }

    /// latest transition time, the later element wins ties
    pub fn most_recently_transitioned(&self) -> Option<&Condition> {
        self.0.iter().max_by_key(|c| c.last_transition_time)
    }

    /// worst condition by status and severity, the earlier element wins ties
    pub fn highest_severity(&self) -> Option<&Condition> {
        self.0.iter().fold(None, |worst, c| match worst {
            Some(w) if w.badness() >= c.badness() => Some(w),
            _ => Some(c),
        })
    }
}

impl<'a> IntoIterator for &'a Conditions {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
