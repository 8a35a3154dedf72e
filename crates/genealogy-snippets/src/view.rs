//! The two surfaces of the viewer.
//!
//! [`CatalogView`] is the default view: it shows the whole catalog, reloads
//! it when another context changes the catalog slot, and can clear it.
//! [`ExtensionEndpoint`] is the surface the extension talks to: it ingests
//! pushed records and acknowledges each message.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::family::{group_catalog, PageGroups};
use crate::message::{Acknowledgment, ExtensionMessage, ADD_DATA};
use crate::record::PageRecord;
use crate::storage::{Change, KeyValueStore, Subscription};

/// The catalog as currently displayed.
#[derive(Debug)]
pub struct CatalogView<S> {
    catalog: Catalog<S>,
    records: Vec<PageRecord>,
}

impl<S: KeyValueStore> CatalogView<S> {
    /// Open the view, loading the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(catalog: Catalog<S>) -> Result<Self> {
        let records = catalog.load()?;
        debug!("Catalog view opened with {} records", records.len());
        Ok(Self { catalog, records })
    }

    /// Records currently displayed.
    #[must_use]
    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    /// The catalog backing this view.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    /// Display groups for every record, in catalog order.
    #[must_use]
    pub fn groups(&self) -> Vec<PageGroups<'_>> {
        group_catalog(&self.records)
    }

    /// Re-read the whole catalog, replacing what is displayed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn reload(&mut self) -> Result<()> {
        self.records = self.catalog.load()?;
        debug!("Catalog view reloaded with {} records", self.records.len());
        Ok(())
    }

    /// React to a slot change; reloads only when the catalog slot changed.
    ///
    /// Returns whether the view reloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn on_storage_change(&mut self, key: &str) -> Result<bool> {
        self.on_change(&Change::Key(key.to_string()))
    }

    /// React to a feed notice.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn on_change(&mut self, change: &Change) -> Result<bool> {
        if !change.affects(self.catalog.key()) {
            return Ok(false);
        }
        if let Change::Lagged(missed) = change {
            warn!("Missed {missed} change notices, reloading catalog");
        }
        self.reload()?;
        Ok(true)
    }

    /// Empty the catalog and the view.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn clear_all(&mut self) -> Result<()> {
        self.catalog.clear()?;
        self.records.clear();
        Ok(())
    }

    /// Follow a subscription until the feed closes, calling `on_reload`
    /// after every reload.
    ///
    /// # Errors
    ///
    /// Returns an error if a reload fails.
    pub async fn follow<F>(&mut self, subscription: &mut Subscription, mut on_reload: F) -> Result<()>
    where
        F: FnMut(&Self),
    {
        while let Some(change) = subscription.next().await {
            if self.on_change(&change)? {
                on_reload(self);
            }
        }
        debug!("Change feed closed");
        Ok(())
    }
}

/// Receives extension messages and ingests their records.
#[derive(Debug)]
pub struct ExtensionEndpoint<S> {
    catalog: Catalog<S>,
}

impl<S: KeyValueStore> ExtensionEndpoint<S> {
    /// Create an endpoint writing into `catalog`.
    pub fn new(catalog: Catalog<S>) -> Self {
        Self { catalog }
    }

    /// The catalog this endpoint writes to.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    /// Ingest a decoded message and build its acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn handle(&mut self, message: ExtensionMessage) -> Result<Acknowledgment> {
        match message {
            ExtensionMessage::AddData { data } => {
                let outcome = self.catalog.ingest(data)?;
                Ok(Acknowledgment::from(outcome))
            }
        }
    }

    /// Handle a raw JSON message.
    ///
    /// The records of a data addition are stored as sent, without checking
    /// them against the record schema. Returns `None` for messages that are
    /// not data additions or carry no record list; those are logged and get
    /// no reply. A stored catalog that cannot be read is left alone and the
    /// message gets no reply either.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn handle_raw(&mut self, raw: &[u8]) -> Result<Option<Acknowledgment>> {
        let mut value: Value = match serde_json::from_slice(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring message that is not JSON: {e}");
                return Ok(None);
            }
        };

        let tag = value.get("message").and_then(Value::as_str);
        if tag != Some(ADD_DATA) {
            debug!("Ignoring message with tag {tag:?}");
            return Ok(None);
        }

        let Some(Value::Array(records)) = value.get_mut("data").map(Value::take) else {
            warn!("Ignoring {ADD_DATA} message without a data list");
            return Ok(None);
        };

        match self.catalog.ingest_raw(records) {
            Ok(outcome) => {
                let ack = Acknowledgment::from(outcome);
                info!("Acknowledging extension message: {}", ack.response);
                Ok(Some(ack))
            }
            Err(e @ Error::CatalogUndecodable { .. }) => {
                error!("Not storing extension records: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
