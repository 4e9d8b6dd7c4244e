use crate::model::{Activity, IdentityKey, MrKeyScheme};
use crate::store::PriorState;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Identity keys already present in the persisted record.
#[derive(Debug, Clone, Default)]
pub struct ExistingIdentities {
    commit_shas: HashSet<String>,
    mr_keys: HashSet<String>,
}

impl ExistingIdentities {
    pub fn from_activities(activities: &[Activity], scheme: MrKeyScheme) -> Self {
        let mut identities = Self::default();
        for activity in activities {
            identities.insert(activity.identity_key(scheme));
        }
        identities
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        match key {
            IdentityKey::Commit(sha) => self.commit_shas.contains(sha),
            IdentityKey::MergeRequest(k) => self.mr_keys.contains(k),
        }
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: IdentityKey) -> bool {
        match key {
            IdentityKey::Commit(sha) => self.commit_shas.insert(sha),
            IdentityKey::MergeRequest(k) => self.mr_keys.insert(k),
        }
    }

    pub fn commit_shas(&self) -> &HashSet<String> {
        &self.commit_shas
    }

    pub fn mr_keys(&self) -> &HashSet<String> {
        &self.mr_keys
    }
}

pub fn extract_existing_identities(prior: &PriorState, scheme: MrKeyScheme) -> ExistingIdentities {
    ExistingIdentities::from_activities(prior.activities(), scheme)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Items of the batch not seen before, in batch order.
    pub delta: Vec<Activity>,
    /// The full collection, newest first.
    pub activities: Vec<Activity>,
}

impl Reconciled {
    /// `false` when the prior collection was returned untouched.
    pub fn changed(&self) -> bool {
        !self.delta.is_empty()
    }
}

/// Merges `new_batch` into `prior`, dropping anything whose identity key is
/// already known. Duplicates inside the batch keep their first occurrence.
pub fn reconcile(
    new_batch: Vec<Activity>,
    prior_identities: &ExistingIdentities,
    prior: &[Activity],
    scheme: MrKeyScheme,
) -> Reconciled {
    let mut batch_keys = ExistingIdentities::default();
    let delta: Vec<Activity> = new_batch
        .into_iter()
        .filter(|a| {
            let key = a.identity_key(scheme);
            !prior_identities.contains(&key) && batch_keys.insert(key)
        })
        .collect();

    if delta.is_empty() && !prior.is_empty() {
        return Reconciled {
            delta,
            activities: prior.to_vec(),
        };
    }

    let mut activities = Vec::with_capacity(prior.len() + delta.len());
    activities.extend_from_slice(prior);
    activities.extend_from_slice(&delta);
    sort_descending_by_date(&mut activities);

    Reconciled { delta, activities }
}

/// Stable sort, newest first. Unparseable dates go last.
pub fn sort_descending_by_date(activities: &mut [Activity]) {
    activities.sort_by_cached_key(|a| Reverse(a.timestamp()));
}
