use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::{CollaboratorError, EndpointNotFound, Status};

use super::{ConditionType, Conditions, Endpoint, HashTag, Severity, ERROR_REASON, REQUESTED_REASON};

/// Observed state of a PlacementAPI deployment, written only by the reconciler.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementApiStatus {
    /// pods currently serving requests
    #[serde(skip_serializing_if = "is_zero")]
    pub ready_count: i32,
    /// change detection hashes by tag
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hash: BTreeMap<HashTag, String>,
    /// service urls by endpoint class
    #[serde(rename = "apiEndpoint", skip_serializing_if = "BTreeMap::is_empty")]
    pub api_endpoints: BTreeMap<Endpoint, String>,
    #[serde(skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database_hostname: String,
    /// id assigned by the identity service, empty until registered
    #[serde(rename = "serviceID", skip_serializing_if = "String::is_empty")]
    pub service_id: String,
    /// addresses assigned to the pods per network attachment
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub network_attachments: BTreeMap<String, Vec<String>>,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

impl Status for PlacementApiStatus {}

impl PlacementApiStatus {
    /// Store `value` under `tag`, replacing any previous value.
    /// Returns true when the stored value changed, including first record.
    pub fn record_hash(&mut self, tag: &HashTag, value: impl Into<String>) -> bool {
        let value = value.into();
        let previous = self.hash.insert(tag.clone(), value.clone());
        let changed = previous.as_deref() != Some(value.as_str());
        debug!(%tag, changed, "record hash");
        changed
    }

    /// None if the tag was never recorded. An empty string is a recorded value.
    pub fn get_hash(&self, tag: &HashTag) -> Option<&str> {
        self.hash.get(tag).map(String::as_str)
    }

    pub fn has_hash(&self, tag: &HashTag) -> bool {
        self.hash.contains_key(tag)
    }

    /// true if `candidate` differs from the recorded hash or nothing is recorded yet
    pub fn hash_changed(&self, tag: &HashTag, candidate: &str) -> bool {
        self.get_hash(tag) != Some(candidate)
    }

    pub fn get_endpoint(&self, endpoint: &Endpoint) -> Result<&str, EndpointNotFound> {
        self.api_endpoints
            .get(endpoint)
            .map(String::as_str)
            .ok_or_else(|| EndpointNotFound(endpoint.to_string()))
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint, url: impl Into<String>) {
        self.api_endpoints.insert(endpoint, url.into());
    }

    /// Registered with the identity service and at least one pod serving.
    pub fn is_ready(&self) -> bool {
        !self.service_id.is_empty() && self.ready_count >= 1
    }

    pub fn observe_credentials(&mut self, result: Result<(), CollaboratorError>) {
        match result {
            Ok(()) => self
                .conditions
                .mark_true(ConditionType::InputReady, "Input data complete"),
            Err(err) => self.observe_failure(ConditionType::InputReady, &err),
        }
    }

    pub fn observe_database(&mut self, result: Result<String, CollaboratorError>) {
        match result {
            Ok(hostname) => {
                self.database_hostname = hostname;
                self.conditions
                    .mark_true(ConditionType::DbReady, "DB create completed");
            }
            Err(err) => self.observe_failure(ConditionType::DbReady, &err),
        }
    }

    /// a failed registration keeps the previously assigned service id
    pub fn observe_registration(&mut self, result: Result<String, CollaboratorError>) {
        match result {
            Ok(service_id) => {
                debug!(%service_id, "service registered");
                self.service_id = service_id;
                self.conditions
                    .mark_true(ConditionType::KeystoneServiceReady, "Setup complete");
            }
            Err(err) => self.observe_failure(ConditionType::KeystoneServiceReady, &err),
        }
    }

    pub fn observe_deregistration(&mut self) {
        debug!(service_id = %self.service_id, "service deregistered");
        self.service_id.clear();
        self.conditions.mark_false(
            ConditionType::KeystoneServiceReady,
            "Deregistered",
            Severity::Info,
            "Service removed from the identity service",
        );
    }

    pub fn observe_ready_count(&mut self, ready_count: i32, desired: i32) {
        self.ready_count = ready_count;
        if ready_count >= desired {
            self.conditions
                .mark_true(ConditionType::DeploymentReady, "Deployment completed");
        } else {
            self.conditions.mark_false(
                ConditionType::DeploymentReady,
                REQUESTED_REASON,
                Severity::Info,
                format!("Deployment in progress ({}/{})", ready_count, desired),
            );
        }
    }

    /// every expected attachment needs at least one address
    pub fn observe_network_attachments(
        &mut self,
        attachments: BTreeMap<String, Vec<String>>,
        expected: &[String],
    ) {
        let missing: Vec<&str> = expected
            .iter()
            .filter(|name| attachments.get(*name).map_or(true, Vec::is_empty))
            .map(String::as_str)
            .collect();
        self.network_attachments = attachments;

        if missing.is_empty() {
            self.conditions.mark_true(
                ConditionType::NetworkAttachmentsReady,
                "NetworkAttachments completed",
            );
        } else {
            self.conditions.mark_false(
                ConditionType::NetworkAttachmentsReady,
                ERROR_REASON,
                Severity::Warning,
                format!("no pod addresses on network attachments: {}", missing.join(", ")),
            );
        }
    }

    fn observe_failure(&mut self, condition_type: ConditionType, err: &CollaboratorError) {
        debug!(%condition_type, %err, "collaborator failure");
        self.conditions.mark_false(
            condition_type,
            err.reason(),
            Severity::Warning,
            err.to_string(),
        );
    }
}

#[cfg(test)]
mod test {

    use std::collections::BTreeMap;

    use super::*;
    use crate::placement::ConditionStatus;

    #[test]
    fn test_readiness_combinations() {
        let cases = [
            ("", 0, false),
            ("", 2, false),
            ("svc-123", 0, false),
            ("svc-123", 1, true),
            ("svc-123", -1, false),
        ];

        for (service_id, ready_count, expected) in cases {
            let status = PlacementApiStatus {
                service_id: service_id.to_owned(),
                ready_count,
                ..Default::default()
            };
            assert_eq!(
                status.is_ready(),
                expected,
                "service_id={:?} ready_count={}",
                service_id,
                ready_count
            );
        }
    }

    #[test]
    fn test_record_hash_overwrites() {
        let mut status = PlacementApiStatus::default();

        assert!(status.record_hash(&HashTag::Deployment, "abc"));
        assert!(status.record_hash(&HashTag::Deployment, "def"));
        assert!(!status.record_hash(&HashTag::Deployment, "def"));

        assert_eq!(status.get_hash(&HashTag::Deployment), Some("def"));
        assert_eq!(status.get_hash(&HashTag::DbSync), None);
    }

    #[test]
    fn test_empty_hash_is_recorded() {
        let mut status = PlacementApiStatus::default();
        assert!(!status.has_hash(&HashTag::DbSync));
        assert!(status.hash_changed(&HashTag::DbSync, ""));

        status.record_hash(&HashTag::DbSync, "");

        assert!(status.has_hash(&HashTag::DbSync));
        assert_eq!(status.get_hash(&HashTag::DbSync), Some(""));
        assert!(!status.hash_changed(&HashTag::DbSync, ""));
    }

    #[test]
    fn test_extra_hash_tags() {
        let mut status = PlacementApiStatus::default();
        let tag = HashTag::from("certs");

        status.record_hash(&tag, "c3rt");

        assert_eq!(status.hash.get("certs").map(String::as_str), Some("c3rt"));
        assert_eq!(status.get_hash(&tag), Some("c3rt"));
    }

    #[test]
    fn test_typed_map_keys_round_trip() {
        //given
        let mut status = PlacementApiStatus::default();
        status.record_hash(&HashTag::Other("dbsync".to_owned()), "abc");
        status.record_hash(&HashTag::DbSync, "def");
        status.set_endpoint(Endpoint::Other("public".to_owned()), "http://old");
        status.set_endpoint(Endpoint::Public, "http://new");

        //when
        let value = serde_json::to_value(&status).expect("encode");
        let decoded: PlacementApiStatus = serde_json::from_value(value.clone()).expect("decode");

        //then
        assert_eq!(status.hash.len(), 1);
        assert_eq!(status.api_endpoints.len(), 1);
        assert_eq!(value["hash"], serde_json::json!({"dbsync": "def"}));
        assert_eq!(value["apiEndpoint"], serde_json::json!({"public": "http://new"}));
        assert_eq!(decoded.hash.keys().next(), Some(&HashTag::DbSync));
        assert_eq!(decoded.get_endpoint(&Endpoint::Public), Ok("http://new"));
    }

    #[test]
    fn test_endpoint_lookup() {
        let mut status = PlacementApiStatus::default();
        status.set_endpoint(Endpoint::Public, "https://x/placement");

        assert_eq!(
            status.get_endpoint(&Endpoint::Public),
            Ok("https://x/placement")
        );
        assert_eq!(
            status.get_endpoint(&Endpoint::Internal),
            Err(EndpointNotFound("internal".to_owned()))
        );
        assert_eq!(
            status
                .get_endpoint(&Endpoint::Internal)
                .unwrap_err()
                .to_string(),
            "internal endpoint not found"
        );
    }

    #[test]
    fn test_failed_registration_keeps_service_id() {
        let mut status = PlacementApiStatus::default();
        status.observe_registration(Ok("svc-1".to_owned()));
        assert!(status
            .conditions
            .is_true(&ConditionType::KeystoneServiceReady));

        status.observe_registration(Err(CollaboratorError::RegistrationFailed(
            "timeout".to_owned(),
        )));

        assert_eq!(status.service_id, "svc-1");
        let condition = status
            .conditions
            .get(&ConditionType::KeystoneServiceReady)
            .expect("condition");
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.reason, "RegistrationFailed");
        assert_eq!(condition.severity, Some(Severity::Warning));
    }

    #[test]
    fn test_deregistration_clears_service_id() {
        let mut status = PlacementApiStatus {
            service_id: "svc-1".to_owned(),
            ready_count: 1,
            ..Default::default()
        };
        assert!(status.is_ready());

        status.observe_deregistration();

        assert!(status.service_id.is_empty());
        assert!(!status.is_ready());
    }

    #[test]
    fn test_database_observation() {
        let mut status = PlacementApiStatus::default();

        status.observe_database(Err(CollaboratorError::DatabaseUnavailable(
            "openstack".to_owned(),
        )));
        assert!(status.database_hostname.is_empty());
        assert_eq!(
            status
                .conditions
                .get(&ConditionType::DbReady)
                .map(|c| c.reason.as_str()),
            Some("DatabaseUnavailable")
        );

        status.observe_database(Ok("openstack.openstack.svc".to_owned()));
        assert_eq!(status.database_hostname, "openstack.openstack.svc");
        assert!(status.conditions.is_true(&ConditionType::DbReady));
    }

    #[test]
    fn test_credentials_observation() {
        let mut status = PlacementApiStatus::default();

        status.observe_credentials(Err(CollaboratorError::CredentialNotFound {
            secret: "osp-secret".to_owned(),
            key: "PlacementPassword".to_owned(),
        }));

        assert!(status.conditions.is_false(&ConditionType::InputReady));
    }

    #[test]
    fn test_ready_count_observation() {
        let mut status = PlacementApiStatus::default();

        status.observe_ready_count(1, 3);
        assert_eq!(status.ready_count, 1);
        assert!(status.conditions.is_false(&ConditionType::DeploymentReady));

        status.observe_ready_count(3, 3);
        assert!(status.conditions.is_true(&ConditionType::DeploymentReady));
    }

    #[test]
    fn test_network_attachments_observation() {
        let expected = vec!["internalapi".to_owned(), "storage".to_owned()];
        let mut attachments = BTreeMap::new();
        attachments.insert("internalapi".to_owned(), vec!["172.17.0.30".to_owned()]);
        attachments.insert("storage".to_owned(), vec![]);
        let mut status = PlacementApiStatus::default();

        status.observe_network_attachments(attachments.clone(), &expected);

        let condition = status
            .conditions
            .get(&ConditionType::NetworkAttachmentsReady)
            .expect("condition");
        assert_eq!(condition.status, ConditionStatus::False);
        assert!(condition.message.contains("storage"));
        assert!(!condition.message.contains("internalapi"));

        attachments.insert("storage".to_owned(), vec!["172.18.0.30".to_owned()]);
        status.observe_network_attachments(attachments, &expected);
        assert!(status
            .conditions
            .is_true(&ConditionType::NetworkAttachmentsReady));
    }

    #[test]
    fn test_empty_status_serializes_empty() {
        let value = serde_json::to_value(PlacementApiStatus::default()).expect("encode");
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_status_wire_names() {
        let mut status = PlacementApiStatus {
            ready_count: 1,
            service_id: "svc".to_owned(),
            ..Default::default()
        };
        status.set_endpoint(Endpoint::Admin, "http://admin");

        let value = serde_json::to_value(&status).expect("encode");

        assert_eq!(value["readyCount"], 1);
        assert_eq!(value["serviceID"], "svc");
        assert_eq!(value["apiEndpoint"]["admin"], "http://admin");
    }
}
