//! # Operation Handlers
//!
//! One handler per operation kind. Each handler performs exactly one logical
//! action against the injected [`ClientStore`] and records the resulting
//! state through the [`Recorder`] before releasing the store lock.
//!
//! Lock discipline: AddItem and RemoveItem take the store's write lock,
//! GetItem and GetAllItems its read lock. A handler that fails returns a
//! [`ServiceError`] and emits no audit line; the dispatcher downgrades the
//! error to a warning.

use log::debug;
use std::sync::Arc;

use crate::common::messages::{OperationKind, Request};

use super::error::ServiceError;
use super::recorder::Recorder;
use super::store::{ClientStore, OrderedValueSet};

/// Applies operations to the client store and records each outcome.
pub struct StoreService {
    store: Arc<ClientStore>,
    recorder: Recorder,
}

impl StoreService {
    pub fn new(store: Arc<ClientStore>, recorder: Recorder) -> Self {
        Self { store, recorder }
    }

    /// Route one request to its handler.
    ///
    /// The match is exhaustive: unknown operation names never reach this
    /// point because the dispatcher rejects them while parsing the kind.
    pub async fn handle(&self, kind: OperationKind, request: &Request) -> Result<(), ServiceError> {
        match kind {
            OperationKind::Add => self.add_item(request).await,
            OperationKind::Remove => self.remove_item(request).await,
            OperationKind::Check => self.check_item(request).await.map(|_| ()),
            OperationKind::ListAll => self.list_items(request).await,
        }
    }

    /// Insert the value into the client's set, creating the set on the
    /// client's first add. Re-adding a present value is a no-op.
    pub async fn add_item(&self, request: &Request) -> Result<(), ServiceError> {
        let value = require_value(request, OperationKind::Add)?;

        let mut clients = self.store.write().await;
        let set = clients.entry(request.client_id).or_default();
        set.insert(value);

        self.record(request, OperationKind::Add, set).await
    }

    /// Delete the value from the client's set. An absent client or value is
    /// a recoverable NotFound condition, never a crash.
    pub async fn remove_item(&self, request: &Request) -> Result<(), ServiceError> {
        let value = require_value(request, OperationKind::Remove)?;

        let mut clients = self.store.write().await;
        let set = clients
            .get_mut(&request.client_id)
            .ok_or(ServiceError::ClientNotFound(request.client_id))?;

        if !set.remove(value) {
            return Err(ServiceError::ValueNotFound {
                client_id: request.client_id,
                value: value.to_string(),
            });
        }

        self.record(request, OperationKind::Remove, set).await
    }

    /// Membership test. Never mutates the store; returns whether the value
    /// is present.
    pub async fn check_item(&self, request: &Request) -> Result<bool, ServiceError> {
        let value = require_value(request, OperationKind::Check)?;

        let clients = self.store.read().await;
        let set = clients
            .get(&request.client_id)
            .ok_or(ServiceError::ClientNotFound(request.client_id))?;

        let present = set.contains(value);
        debug!(
            "client {} value '{}' present: {}",
            request.client_id, value, present
        );

        self.record(request, OperationKind::Check, set).await?;
        Ok(present)
    }

    /// Enumerate the client's set. A client with no set reads as empty and
    /// is not an error.
    pub async fn list_items(&self, request: &Request) -> Result<(), ServiceError> {
        let clients = self.store.read().await;

        match clients.get(&request.client_id) {
            Some(set) => self.record(request, OperationKind::ListAll, set).await,
            None => {
                self.record(request, OperationKind::ListAll, &OrderedValueSet::default())
                    .await
            }
        }
    }

    /// Emit the audit line for a completed operation. Callers invoke this
    /// while their store guard is still alive.
    async fn record(
        &self,
        request: &Request,
        kind: OperationKind,
        set: &OrderedValueSet,
    ) -> Result<(), ServiceError> {
        let state: Vec<&str> = set.iter().collect();
        self.recorder
            .record(request.client_id, kind, request.value.as_deref(), &state)
            .await?;
        Ok(())
    }
}

/// The item value of the request, or `MissingValue` when the operation needs
/// one and the request carried none. An empty string counts as missing; the
/// wire format omits the field instead of sending "".
fn require_value(request: &Request, kind: OperationKind) -> Result<&str, ServiceError> {
    request
        .value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(ServiceError::MissingValue(kind.as_str()))
}
