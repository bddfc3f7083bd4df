use {
    crate::{decode_role_trust, Role, VeilError},
    log::{debug, warn},
    parking_lot::Mutex,
    std::{collections::HashMap, panic, sync::Arc},
    tokio::task::JoinSet,
    tokio_util::sync::CancellationToken,
};

/// Role ARN to the sorted, deduplicated principals its trust policy names.
pub type RoleTrustMap = HashMap<String, Vec<String>>;

/// Decodes the trust policies of many roles concurrently, one task per role.
///
/// The first task to fail records its error and cancels the group; tasks that have not yet started see the
/// cancellation and skip their work, while tasks already decoding run to completion. [`TrustResolver::wait`] joins
/// every task before returning, and returns either the complete map or the first error, never a partial map.
///
/// Tasks are spawned onto the current Tokio runtime.
pub struct TrustResolver {
    output: Arc<Mutex<RoleTrustMap>>,
    first_error: Arc<Mutex<Option<VeilError>>>,
    group: CancellationToken,
    tasks: JoinSet<()>,
}

impl TrustResolver {
    /// Create a resolver whose tasks stop when `cancel` is cancelled. Failures inside the resolver never cancel
    /// `cancel` itself.
    pub fn new(cancel: &CancellationToken) -> Self {
        Self {
            output: Arc::new(Mutex::new(RoleTrustMap::new())),
            first_error: Arc::new(Mutex::new(None)),
            group: cancel.child_token(),
            tasks: JoinSet::new(),
        }
    }

    /// Decode every role in `roles` and collect the principals each one trusts.
    pub async fn resolve(roles: Vec<Role>, cancel: &CancellationToken) -> Result<RoleTrustMap, VeilError> {
        let mut resolver = Self::new(cancel);
        for role in roles {
            resolver.spawn(role);
        }

        resolver.wait().await
    }

    /// Start the task for a single role.
    pub fn spawn(&mut self, role: Role) {
        let output = Arc::clone(&self.output);
        let first_error = Arc::clone(&self.first_error);
        let group = self.group.clone();

        self.tasks.spawn(async move {
            let result = if group.is_cancelled() {
                Err(VeilError::Cancelled)
            } else {
                resolve_role(&role, &output)
            };

            if let Err(e) = result {
                let mut slot = first_error.lock();
                if slot.is_none() {
                    warn!("Trust resolution failed; cancelling remaining roles: role={} error={}", role.arn(), e);
                    *slot = Some(e);
                    group.cancel();
                } else {
                    debug!("Discarding error after first failure: role={} error={}", role.arn(), e);
                }
            }
        });
    }

    /// Wait for every spawned task, then return the map or the first error.
    pub async fn wait(mut self) -> Result<RoleTrustMap, VeilError> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    panic::resume_unwind(e.into_panic());
                }

                let mut slot = self.first_error.lock();
                if slot.is_none() {
                    *slot = Some(VeilError::Cancelled);
                    self.group.cancel();
                }
            }
        }

        if let Some(e) = self.first_error.lock().take() {
            return Err(e);
        }

        let output = std::mem::take(&mut *self.output.lock());
        Ok(output)
    }
}

fn resolve_role(role: &Role, output: &Mutex<RoleTrustMap>) -> Result<(), VeilError> {
    let policy = decode_role_trust(role)?;
    let principals = policy.principals();
    debug!("Resolved role trust: role={} principals={}", role.arn(), principals.len());

    output.lock().insert(role.arn().to_string(), principals);
    Ok(())
}
