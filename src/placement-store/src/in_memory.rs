use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use placement_types::placement::{
    PlacementApi, PlacementApiList, PlacementApiSpecInput, PlacementApiStatus, SpecDefaults,
};
use placement_types::{ItemMeta, ObjectMeta, ValidationError, DEFAULT_NS};

use crate::NameSpace;
use crate::StoreError;

type ItemMap = HashMap<ItemMeta, PlacementApi>;

/// outcome of re-applying a spec to an existing resource
#[derive(Debug)]
pub enum ApplyResult {
    Unchanged(PlacementApi),
    Patched(PlacementApi),
}

impl ApplyResult {
    pub fn is_patched(&self) -> bool {
        matches!(self, Self::Patched(_))
    }

    pub fn into_inner(self) -> PlacementApi {
        match self {
            Self::Unchanged(obj) | Self::Patched(obj) => obj,
        }
    }
}

/// PlacementAPI resources keyed by namespace and name.
///
/// Every read hands out a clone, so callers never observe a
/// half written spec or status.
#[derive(Debug, Default)]
pub struct PlacementStore {
    store: Arc<RwLock<ItemMap>>,
    defaults: SpecDefaults,
}

impl PlacementStore {
    pub fn new(defaults: SpecDefaults) -> Self {
        Self {
            store: Arc::default(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &SpecDefaults {
        &self.defaults
    }

    /// default and validate input, then insert a new resource with empty status
    pub fn create(
        &self,
        mut metadata: ObjectMeta,
        input: PlacementApiSpecInput,
    ) -> Result<PlacementApi, StoreError> {
        if metadata.name.trim().is_empty() {
            return Err(ValidationError::MissingField("metadata.name").into());
        }
        if metadata.namespace.is_empty() {
            metadata.namespace = DEFAULT_NS.to_owned();
        }
        let spec = input.into_spec(&self.defaults)?;
        let item_key = metadata.as_item();

        let mut store = self.store.write()?;
        if store.contains_key(&item_key) {
            return Err(StoreError::AlreadyExists(item_key));
        }
        let obj = PlacementApi::new(metadata, spec);
        store.insert(item_key.clone(), obj.clone());
        debug!(key = %item_key, "created");
        Ok(obj)
    }

    /// replace the spec of an existing resource, status is kept as is
    pub fn apply_spec(
        &self,
        key: &ItemMeta,
        input: PlacementApiSpecInput,
    ) -> Result<ApplyResult, StoreError> {
        let spec = input.into_spec(&self.defaults)?;

        let mut store = self.store.write()?;
        let obj = store
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        if obj.spec == spec {
            trace!(%key, "spec unchanged");
            return Ok(ApplyResult::Unchanged(obj.clone()));
        }
        obj.spec = spec;
        debug!(%key, "spec updated");
        Ok(ApplyResult::Patched(obj.clone()))
    }

    pub fn retrieve(&self, key: &ItemMeta) -> Result<PlacementApi, StoreError> {
        let store = self.store.read()?;
        store
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    /// run the update against the stored status under the write lock
    /// and return the resulting snapshot
    pub fn update_status<F>(&self, key: &ItemMeta, update: F) -> Result<PlacementApi, StoreError>
    where
        F: FnOnce(&mut PlacementApiStatus),
    {
        let mut store = self.store.write()?;
        let obj = store
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        update(&mut obj.status);
        trace!(%key, ready = obj.status.is_ready(), "status updated");
        Ok(obj.clone())
    }

    pub fn delete(&self, key: &ItemMeta) -> Result<PlacementApi, StoreError> {
        let mut store = self.store.write()?;
        let obj = store
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        debug!(%key, "deleted");
        Ok(obj)
    }

    /// resources in the namespace, ordered by namespace then name
    pub fn list<N>(&self, namespace: N) -> Result<PlacementApiList, StoreError>
    where
        N: Into<NameSpace>,
    {
        let namespace = namespace.into();
        let store = self.store.read()?;
        let mut items: Vec<(&ItemMeta, &PlacementApi)> = store
            .iter()
            .filter(|(key, _)| namespace.matches(&key.namespace))
            .collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        trace!(namespace = namespace.named(), count = items.len(), "list");
        Ok(PlacementApiList::with_items(
            items.into_iter().map(|(_, obj)| obj.clone()).collect(),
        ))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.store.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod test {

    use placement_types::placement::{
        ConditionType, PlacementApiSpecInput, SpecDefaults, DEFAULT_CONTAINER_IMAGE,
    };
    use placement_types::{ItemMeta, ObjectMeta, ValidationError};

    use super::PlacementStore;
    use crate::{NameSpace, StoreError};

    fn new_input() -> PlacementApiSpecInput {
        PlacementApiSpecInput {
            database_instance: Some("openstack".to_owned()),
            secret: Some("osp-secret".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_retrieve() {
        let store = PlacementStore::default();

        let item = store
            .create(ObjectMeta::new("placement", "openstack"), new_input())
            .expect("placement should be created");

        let retrieved = store.retrieve(&item.key()).expect("retrieve should work");
        assert_eq!(retrieved.spec, item.spec);
        assert_eq!(retrieved.spec.container_image, DEFAULT_CONTAINER_IMAGE);
        assert_eq!(retrieved.status, Default::default());
        assert_eq!(retrieved.kind, "PlacementAPI");
        assert_eq!(retrieved.api_version, "placement.openstack.org/v1beta1");
    }

    #[test]
    fn test_create_defaults_namespace() {
        let store = PlacementStore::default();

        let item = store
            .create(
                ObjectMeta {
                    name: "placement".to_owned(),
                    ..Default::default()
                },
                new_input(),
            )
            .expect("create");

        assert_eq!(item.key(), ItemMeta::new("placement", "default"));
    }

    #[test]
    fn test_create_rejects_invalid_spec() {
        let store = PlacementStore::default();
        let input = PlacementApiSpecInput {
            replicas: Some(33),
            ..new_input()
        };

        let err = store
            .create(ObjectMeta::new("placement", "openstack"), input)
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::ReplicasOutOfRange(33))
        ));
        assert!(store.is_empty().expect("len"));
    }

    #[test]
    fn test_create_requires_name() {
        let store = PlacementStore::default();

        let err = store
            .create(ObjectMeta::default(), new_input())
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_create_twice() {
        let store = PlacementStore::default();
        let meta = ObjectMeta::new("placement", "openstack");
        store.create(meta.clone(), new_input()).expect("create");

        let err = store.create(meta, new_input()).unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn test_store_defaults_override() {
        let store = PlacementStore::new(SpecDefaults {
            container_image: "registry.local/placement:stable".to_owned(),
            ..Default::default()
        });

        let item = store
            .create(ObjectMeta::new("placement", "openstack"), new_input())
            .expect("create");

        assert_eq!(item.spec.container_image, "registry.local/placement:stable");
    }

    #[test]
    fn test_apply_spec_keeps_status() {
        //given
        let store = PlacementStore::default();
        let item = store
            .create(ObjectMeta::new("placement", "openstack"), new_input())
            .expect("create");
        store
            .update_status(&item.key(), |status| {
                status.database_hostname = "openstack.openstack.svc".to_owned();
            })
            .expect("status");

        //when
        let unchanged = store
            .apply_spec(&item.key(), new_input())
            .expect("apply");
        let patched = store
            .apply_spec(
                &item.key(),
                PlacementApiSpecInput {
                    replicas: Some(3),
                    ..new_input()
                },
            )
            .expect("apply");

        //then
        assert!(!unchanged.is_patched());
        assert!(patched.is_patched());
        let obj = patched.into_inner();
        assert_eq!(obj.spec.replicas, 3);
        assert_eq!(obj.status.database_hostname, "openstack.openstack.svc");
    }

    #[test]
    fn test_apply_invalid_spec_keeps_previous() {
        let store = PlacementStore::default();
        let item = store
            .create(ObjectMeta::new("placement", "openstack"), new_input())
            .expect("create");

        let err = store
            .apply_spec(
                &item.key(),
                PlacementApiSpecInput {
                    replicas: Some(-1),
                    ..new_input()
                },
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.retrieve(&item.key()).expect("get").spec.replicas, 1);
    }

    #[test]
    fn test_update_status_returns_snapshot() {
        let store = PlacementStore::default();
        let item = store
            .create(ObjectMeta::new("placement", "openstack"), new_input())
            .expect("create");

        let updated = store
            .update_status(&item.key(), |status| {
                status.conditions.mark_true(ConditionType::DbReady, "DB create completed");
                status.ready_count = 1;
            })
            .expect("update");
        let snapshot = store.retrieve(&item.key()).expect("get");

        assert_eq!(updated.status, snapshot.status);
        assert_eq!(updated.spec, item.spec);
        assert!(snapshot.status.conditions.is_true(&ConditionType::DbReady));
        // snapshots are detached from the store
        assert!(item.status.conditions.is_empty());
    }

    #[test]
    fn test_missing_keys() {
        let store = PlacementStore::default();
        let key = ItemMeta::new("placement", "openstack");

        assert!(store.retrieve(&key).unwrap_err().not_found());
        assert!(store.delete(&key).unwrap_err().not_found());
        assert!(store.update_status(&key, |_| {}).unwrap_err().not_found());
        assert!(store
            .apply_spec(&key, new_input())
            .unwrap_err()
            .not_found());
    }

    #[test]
    fn test_list_and_delete() {
        let store = PlacementStore::default();
        for (name, ns) in [("b", "openstack"), ("a", "openstack"), ("c", "other")] {
            store
                .create(ObjectMeta::new(name, ns), new_input())
                .expect("create");
        }

        let names = |list: placement_types::placement::PlacementApiList| {
            list.items
                .into_iter()
                .map(|obj| obj.metadata.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(store.list("openstack").expect("list")), vec!["a", "b"]);
        assert_eq!(names(store.list(NameSpace::All).expect("list")), vec!["a", "b", "c"]);

        store
            .delete(&ItemMeta::new("a", "openstack"))
            .expect("delete");
        assert_eq!(names(store.list("openstack").expect("list")), vec!["b"]);
        assert_eq!(store.len().expect("len"), 2);
    }
}
