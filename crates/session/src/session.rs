use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orderdesk_core::{
    CompanyCode, DocumentTypeId, DomainError, DomainResult, Money, OrderId, VendorNumber,
};
use orderdesk_orders::{LineItem, Order, ReferenceEntity, ReferenceKind};
use orderdesk_store::{BatchRequest, LineItemKey, OrderStore, StoreError};

use crate::draft::{DraftLine, DraftOrder};
use crate::notify::{Notifier, Subscription};

/// Identity of one editing session.
///
/// Carried by async lookup tokens so a response can be matched against the
/// session it was issued for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Session mode. The enum is authoritative; the boolean accessors on
/// [`Session`] are derived from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Display,
    Editing { create: bool },
}

/// Outcome of a save attempt that did not error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Benign no-op: nothing was dirty and nothing was pending deletion.
    NothingToSave,
}

/// Token handed out by the reference-field setters.
///
/// The denormalized display copy is resolved asynchronously; the generation
/// baked into the token lets the session ignore a response that arrives after
/// the state it targeted was reset by `cancel()` or `begin_create()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLookup {
    pub(crate) session: SessionId,
    pub(crate) generation: u64,
    pub kind: ReferenceKind,
    pub key: String,
}

/// Result of applying an asynchronously resolved reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The session was reset after the lookup was issued; response ignored.
    Stale,
}

/// Coarse change notification; observers re-read the session on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChanged {
    pub session: SessionId,
    pub generation: u64,
    pub mode: Mode,
    pub occurred_at: DateTime<Utc>,
}

/// Field patch for a line item; `None` leaves a field unchanged.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LineItemUpdate {
    pub quantity: Option<i64>,
    pub rate: Option<Money>,
}

/// Editing context over one purchase order and its line items.
///
/// The session exclusively owns the in-memory order for the duration of an
/// edit; the store is the system of record once persisted. Mutations require
/// `&mut self`, so no observer can read a torn intermediate state and a
/// second save cannot start while one is in flight.
pub struct Session {
    id: SessionId,
    store: Arc<dyn OrderStore>,
    mode: Mode,
    order: Option<DraftOrder>,
    lines: Vec<DraftLine>,
    /// Next item number to allocate. Monotonic: numbers freed by deletion
    /// are never reused.
    next_item_no: u32,
    /// Bumped whenever local state is reset. Async responses carry the
    /// generation they were issued under and are ignored on mismatch.
    generation: u64,
    notifier: Notifier<StateChanged>,
}

impl Session {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            id: SessionId::new(),
            store,
            mode: Mode::Display,
            order: None,
            lines: Vec::new(),
            next_item_no: 1,
            generation: 0,
            notifier: Notifier::new(),
        }
    }

    // --- read accessors -------------------------------------------------

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_edit_mode(&self) -> bool {
        matches!(self.mode, Mode::Editing { .. })
    }

    pub fn is_display_mode(&self) -> bool {
        matches!(self.mode, Mode::Display)
    }

    /// True iff the wrapped order exists only client-side.
    pub fn is_create_mode(&self) -> bool {
        matches!(self.mode, Mode::Editing { create: true })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn order(&self) -> Option<&DraftOrder> {
        self.order.as_ref()
    }

    /// All visible rows, including those marked for deletion.
    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Sum of `amount` over rows not marked for deletion. Computed on
    /// demand; no cached value survives a mutation.
    pub fn total_amount(&self) -> Money {
        self.lines
            .iter()
            .filter(|line| !line.pending_delete)
            .filter_map(|line| line.item.amount)
            .sum()
    }

    pub fn has_pending_changes(&self) -> bool {
        let header = self
            .order
            .as_ref()
            .is_some_and(|draft| draft.transient || draft.dirty);
        header
            || self
                .lines
                .iter()
                .any(|line| line.transient || line.dirty || line.pending_delete)
    }

    pub fn subscribe(&mut self) -> Subscription<StateChanged> {
        self.notifier.subscribe()
    }

    // --- state machine --------------------------------------------------

    /// Start drafting a new order. Discards whatever the session held before.
    pub fn begin_create(&mut self) {
        self.generation += 1;
        self.order = Some(DraftOrder::transient());
        self.lines.clear();
        self.next_item_no = 1;
        self.mode = Mode::Editing { create: true };
        tracing::debug!(session = %self.id, "begin create");
        self.notify();
    }

    /// Load an order for display. On failure the session is unchanged.
    pub async fn open(&mut self, order_id: &OrderId) -> DomainResult<()> {
        if self.is_edit_mode() {
            return Err(DomainError::invariant("cancel or save the edit first"));
        }
        let (order, items) = self.load(order_id).await?;
        self.apply_loaded(order, items, Mode::Display);
        Ok(())
    }

    /// Load an order and enter edit mode. On failure the session is
    /// unchanged.
    pub async fn begin_edit(&mut self, order_id: &OrderId) -> DomainResult<()> {
        if self.is_edit_mode() {
            return Err(DomainError::invariant("already editing"));
        }
        let (order, items) = self.load(order_id).await?;
        self.apply_loaded(order, items, Mode::Editing { create: false });
        Ok(())
    }

    /// Switch the currently displayed order into edit mode.
    pub fn edit(&mut self) -> DomainResult<()> {
        if self.is_edit_mode() {
            return Err(DomainError::invariant("already editing"));
        }
        if self.order.is_none() {
            return Err(DomainError::invariant("no order loaded"));
        }
        self.mode = Mode::Editing { create: false };
        self.notify();
        Ok(())
    }

    /// Discard all local mutations and return to display mode.
    ///
    /// Persisted orders are reloaded from the store; a transient draft is
    /// dropped entirely (nothing existed server-side).
    pub async fn cancel(&mut self) -> DomainResult<()> {
        self.editing()?;
        self.store
            .reset_pending_changes()
            .await
            .map_err(store_error)?;

        let draft = self
            .order
            .as_ref()
            .ok_or_else(|| DomainError::invariant("no order loaded"))?;
        if draft.transient {
            self.generation += 1;
            self.order = None;
            self.lines.clear();
            self.next_item_no = 1;
            self.mode = Mode::Display;
            self.notify();
        } else {
            let order_id = draft.order.id.clone();
            let (order, items) = self.load(&order_id).await?;
            self.apply_loaded(order, items, Mode::Display);
        }
        tracing::debug!(session = %self.id, "changes discarded");
        Ok(())
    }

    // --- header mutations -----------------------------------------------

    /// Assign the user-chosen order id. Only transient orders may be
    /// renumbered; the id is immutable once persisted.
    pub fn set_order_id(&mut self, id: OrderId) -> DomainResult<()> {
        self.editing()?;
        let draft = self.order_mut()?;
        if !draft.transient {
            return Err(DomainError::invariant("order id is immutable once persisted"));
        }
        draft.order.id = id;
        draft.dirty = true;
        self.notify();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> DomainResult<()> {
        self.editing()?;
        let draft = self.order_mut()?;
        draft.order.description = description.into();
        draft.dirty = true;
        self.notify();
        Ok(())
    }

    /// Set the vendor foreign key. The denormalized copy is resolved
    /// separately via the returned lookup token.
    pub fn set_vendor(&mut self, number: VendorNumber) -> DomainResult<ReferenceLookup> {
        self.editing()?;
        let lookup = self.lookup(ReferenceKind::Vendor, number.as_str());
        let draft = self.order_mut()?;
        draft.order.vendor_number = Some(number);
        draft.dirty = true;
        self.notify();
        Ok(lookup)
    }

    pub fn set_company(&mut self, code: CompanyCode) -> DomainResult<ReferenceLookup> {
        self.editing()?;
        let lookup = self.lookup(ReferenceKind::Company, code.as_str());
        let draft = self.order_mut()?;
        draft.order.company_code = Some(code);
        draft.dirty = true;
        self.notify();
        Ok(lookup)
    }

    pub fn set_document_type(&mut self, id: DocumentTypeId) -> DomainResult<ReferenceLookup> {
        self.editing()?;
        let lookup = self.lookup(ReferenceKind::DocumentType, id.as_str());
        let draft = self.order_mut()?;
        draft.order.document_type_id = Some(id);
        draft.dirty = true;
        self.notify();
        Ok(lookup)
    }

    /// Apply an asynchronously resolved reference entity. A response issued
    /// before the last reset, or for a key the user has since retyped, is
    /// ignored: applying it would pair a foreign key with the display copy of
    /// a different one.
    pub fn attach_reference(
        &mut self,
        lookup: &ReferenceLookup,
        entity: ReferenceEntity,
    ) -> DomainResult<Applied> {
        if lookup.session != self.id
            || lookup.generation != self.generation
            || !self.lookup_is_current(lookup)
        {
            tracing::debug!(
                session = %self.id,
                kind = %lookup.kind,
                key = %lookup.key,
                "ignoring stale reference response"
            );
            return Ok(Applied::Stale);
        }
        let draft = self.order_mut()?;
        match entity {
            ReferenceEntity::Vendor(vendor) => draft.order.vendor = Some(vendor),
            ReferenceEntity::Company(company) => draft.order.company = Some(company),
            ReferenceEntity::DocumentType(doc_type) => draft.order.document_type = Some(doc_type),
        }
        self.notify();
        Ok(Applied::Applied)
    }

    /// Resolve and attach the denormalized copy for a previously set foreign
    /// key. A failed resolution is a non-blocking warning: the foreign key
    /// stays set and saving is not gated on it.
    pub async fn refresh_reference(&mut self, lookup: &ReferenceLookup) -> DomainResult<Applied> {
        let resolved = self.store.fetch_reference(lookup.kind, &lookup.key).await;
        match resolved {
            Ok(entity) => self.attach_reference(lookup, entity),
            Err(err) => {
                tracing::warn!(
                    session = %self.id,
                    kind = %lookup.kind,
                    key = %lookup.key,
                    error = %err,
                    "reference resolution failed"
                );
                Err(DomainError::reference_resolution(format!(
                    "{}({}): {err}",
                    lookup.kind, lookup.key
                )))
            }
        }
    }

    // --- line item mutations ---------------------------------------------

    /// Add a row. In create mode the order id must be entered first.
    pub fn add_line_item(
        &mut self,
        quantity: Option<i64>,
        rate: Option<Money>,
    ) -> DomainResult<u32> {
        self.editing()?;
        let draft = self
            .order
            .as_ref()
            .ok_or_else(|| DomainError::invariant("no order loaded"))?;
        if draft.transient && draft.order.id.is_empty() {
            return Err(DomainError::validation(
                "order id required before adding items",
            ));
        }

        let parent = (!draft.order.id.is_empty()).then(|| draft.order.id.clone());
        let item_no = self.next_item_no;
        self.next_item_no += 1;

        let mut item = LineItem::new(item_no, parent);
        item.quantity = quantity;
        item.rate = rate;
        item.recompute_amount();
        self.lines.push(DraftLine::transient(item));
        self.notify();
        Ok(item_no)
    }

    /// Patch a row. The derived amount settles before this returns, so no
    /// observer can read a total that is out of step with the factors.
    pub fn update_line_item(&mut self, item_no: u32, update: LineItemUpdate) -> DomainResult<()> {
        self.editing()?;
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.item.item_no == item_no)
            .ok_or(DomainError::NotFound)?;
        if let Some(quantity) = update.quantity {
            line.item.quantity = Some(quantity);
        }
        if let Some(rate) = update.rate {
            line.item.rate = Some(rate);
        }
        line.item.recompute_amount();
        line.dirty = true;
        self.notify();
        Ok(())
    }

    /// Mark a row for deletion. A transient row is removed outright and
    /// never reaches the store; a persisted row stays visible (excluded from
    /// the total) until save commits the deletion.
    pub fn mark_line_item_for_deletion(&mut self, item_no: u32) -> DomainResult<()> {
        self.editing()?;
        let idx = self
            .lines
            .iter()
            .position(|line| line.item.item_no == item_no)
            .ok_or(DomainError::NotFound)?;
        if self.lines[idx].transient {
            self.lines.remove(idx);
        } else {
            self.lines[idx].pending_delete = true;
        }
        self.notify();
        Ok(())
    }

    pub fn unmark_line_item_for_deletion(&mut self, item_no: u32) -> DomainResult<()> {
        self.editing()?;
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.item.item_no == item_no)
            .ok_or(DomainError::NotFound)?;
        line.pending_delete = false;
        self.notify();
        Ok(())
    }

    // --- save -----------------------------------------------------------

    /// Submit all accumulated changes as one logical batch.
    ///
    /// Any per-operation failure fails the whole save: the error carries the
    /// sub-error detail and local state is left exactly as it was, so the
    /// user may retry or cancel.
    pub async fn save(&mut self) -> DomainResult<SaveOutcome> {
        self.editing()?;
        if !self.has_pending_changes() {
            tracing::debug!(session = %self.id, "nothing to save");
            return Ok(SaveOutcome::NothingToSave);
        }

        let draft = self
            .order
            .as_ref()
            .ok_or_else(|| DomainError::invariant("no order loaded"))?;
        if draft.transient && draft.order.id.is_empty() {
            return Err(DomainError::validation("order id required"));
        }
        let header_id = draft.order.id.clone();
        let transient = draft.transient;

        // Backfill parent ids: rows created before the header id settled, or
        // stamped with a since-retyped transient id.
        for line in &mut self.lines {
            let needs_backfill = match &line.item.parent_order_id {
                None => true,
                Some(existing) => transient && *existing != header_id,
            };
            if needs_backfill {
                line.item.parent_order_id = Some(header_id.clone());
            }
        }

        let mut batch = BatchRequest::default();
        let draft = self
            .order
            .as_ref()
            .ok_or_else(|| DomainError::invariant("no order loaded"))?;
        if draft.transient || draft.dirty {
            let mut header = draft.order.clone();
            // Derived on read; never submitted.
            header.total_amount = None;
            batch.header_upsert = Some(header);
        }
        for line in &self.lines {
            if line.pending_delete {
                batch.item_deletes.push(LineItemKey {
                    order_id: header_id.clone(),
                    item_no: line.item.item_no,
                });
            } else if line.transient || line.dirty {
                batch.item_upserts.push(line.item.clone());
            }
        }

        tracing::debug!(
            session = %self.id,
            order = %header_id,
            ops = batch.len(),
            "submitting batch"
        );
        let result = self
            .store
            .submit_batch(batch)
            .await
            .map_err(|err| DomainError::save_failed(err.to_string()))?;
        if let Some(failure) = result.first_failure() {
            tracing::warn!(
                session = %self.id,
                order = %header_id,
                code = failure.code,
                "save rejected"
            );
            let detail = failure
                .message
                .as_deref()
                .map(|message| format!(": {message}"))
                .unwrap_or_default();
            return Err(DomainError::save_failed(format!(
                "operation {:?} failed with status {}{detail}",
                failure.operation, failure.code
            )));
        }

        // Full success: the store is authoritative now; rebind to it.
        let (order, items) = self.load(&header_id).await?;
        self.apply_loaded(order, items, Mode::Display);
        tracing::info!(session = %self.id, order = %header_id, "changes saved");
        Ok(SaveOutcome::Saved)
    }

    // --- internals -------------------------------------------------------

    fn notify(&mut self) {
        let message = StateChanged {
            session: self.id,
            generation: self.generation,
            mode: self.mode,
            occurred_at: Utc::now(),
        };
        self.notifier.publish(message);
    }

    fn editing(&self) -> DomainResult<()> {
        if self.is_edit_mode() {
            Ok(())
        } else {
            Err(DomainError::invariant("operation is only valid while editing"))
        }
    }

    fn order_mut(&mut self) -> DomainResult<&mut DraftOrder> {
        self.order
            .as_mut()
            .ok_or_else(|| DomainError::invariant("no order loaded"))
    }

    /// True iff the foreign key the lookup was issued for is still the one
    /// set on the draft. A later setter call supersedes earlier lookups of
    /// the same kind without bumping the generation.
    fn lookup_is_current(&self, lookup: &ReferenceLookup) -> bool {
        let Some(draft) = self.order.as_ref() else {
            return false;
        };
        let current = match lookup.kind {
            ReferenceKind::Vendor => draft.order.vendor_number.as_ref().map(VendorNumber::as_str),
            ReferenceKind::Company => draft.order.company_code.as_ref().map(CompanyCode::as_str),
            ReferenceKind::DocumentType => {
                draft.order.document_type_id.as_ref().map(DocumentTypeId::as_str)
            }
        };
        current == Some(lookup.key.as_str())
    }

    fn lookup(&self, kind: ReferenceKind, key: &str) -> ReferenceLookup {
        ReferenceLookup {
            session: self.id,
            generation: self.generation,
            kind,
            key: key.to_string(),
        }
    }

    async fn load(&self, order_id: &OrderId) -> DomainResult<(Order, Vec<LineItem>)> {
        let order = self.store.fetch_order(order_id).await.map_err(store_error)?;
        let items = self
            .store
            .fetch_line_items(order_id)
            .await
            .map_err(store_error)?;
        Ok((order, items))
    }

    fn apply_loaded(&mut self, order: Order, items: Vec<LineItem>, mode: Mode) {
        self.generation += 1;
        let mut lines: Vec<DraftLine> = items.into_iter().map(DraftLine::persisted).collect();
        lines.sort_by_key(DraftLine::item_no);
        self.next_item_no = lines.last().map(|line| line.item_no() + 1).unwrap_or(1);
        self.lines = lines;
        self.order = Some(DraftOrder::persisted(order));
        self.mode = mode;
        self.notify();
    }
}

fn store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound => DomainError::NotFound,
        other => DomainError::store(other.to_string()),
    }
}
