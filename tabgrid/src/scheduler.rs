//! Update coalescing on the UI context.
//!
//! Reload and layout requests are counted rather than flagged. Each request
//! bumps its counter and queues one resolution for the next turn; each
//! resolution drops the counter and only the one that reaches zero does the
//! real work. A burst of N requests before the next turn therefore costs a
//! single pass, and a request arriving after that pass starts a fresh cycle.
//!
//! Requests from other threads go through [`UiHandle`], which forwards them
//! over a channel so counters are only ever touched on the UI context.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::column::ColumnId;

/// Message sent to the UI context from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMessage<C> {
    RequestReload { animate: bool },
    RequestLayout,
    RequestSort(C),
}

/// Cloneable, `Send` capability for submitting work to the UI context.
#[derive(Debug)]
pub struct UiHandle<C> {
    tx: mpsc::UnboundedSender<UiMessage<C>>,
}

impl<C> Clone for UiHandle<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C: ColumnId> UiHandle<C> {
    /// Ask for a data reload on the next turn.
    ///
    /// Non-blocking. Errors are ignored (receiver dropped = grid torn down).
    pub fn request_reload(&self, animate: bool) {
        let _ = self.tx.send(UiMessage::RequestReload { animate });
    }

    /// Ask for a layout pass on the next turn.
    pub fn request_layout(&self) {
        let _ = self.tx.send(UiMessage::RequestLayout);
    }

    /// Ask the grid to advance the sort state of `column`.
    pub fn request_sort(&self, column: C) {
        let _ = self.tx.send(UiMessage::RequestSort(column));
    }
}

/// Work that survived coalescing and must run now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueWork {
    Reload { animate: bool },
    Layout,
}

#[derive(Debug, Clone, Copy)]
enum Resolution {
    Reload { animate: bool },
    Layout,
}

/// Coalescing scheduler owned by the grid controller.
#[derive(Debug)]
pub struct UpdateScheduler<C> {
    tx: mpsc::UnboundedSender<UiMessage<C>>,
    rx: mpsc::UnboundedReceiver<UiMessage<C>>,
    pending_reloads: usize,
    pending_layouts: usize,
    resolutions: VecDeque<Resolution>,
}

impl<C: ColumnId> Default for UpdateScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColumnId> UpdateScheduler<C> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending_reloads: 0,
            pending_layouts: 0,
            resolutions: VecDeque::new(),
        }
    }

    /// Handle for submitting requests from other contexts.
    pub fn handle(&self) -> UiHandle<C> {
        UiHandle {
            tx: self.tx.clone(),
        }
    }

    /// Request a reload. Must be called on the UI context.
    pub fn request_reload(&mut self, animate: bool) {
        self.pending_reloads += 1;
        self.resolutions.push_back(Resolution::Reload { animate });
        log::trace!("reload requested ({} pending)", self.pending_reloads);
    }

    /// Request a layout pass. Must be called on the UI context.
    pub fn request_layout(&mut self) {
        self.pending_layouts += 1;
        self.resolutions.push_back(Resolution::Layout);
        log::trace!("layout requested ({} pending)", self.pending_layouts);
    }

    #[cfg(test)]
    fn pending_reloads(&self) -> usize {
        self.pending_reloads
    }

    #[cfg(test)]
    fn pending_layouts(&self) -> usize {
        self.pending_layouts
    }

    /// Next message submitted through a [`UiHandle`], if any.
    pub fn try_recv(&mut self) -> Option<UiMessage<C>> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message submitted through a [`UiHandle`].
    ///
    /// Never yields `None` while the scheduler is alive, since it keeps a
    /// sender of its own.
    pub async fn recv(&mut self) -> Option<UiMessage<C>> {
        self.rx.recv().await
    }

    /// Whether resolutions are queued for the next turn.
    pub fn has_resolutions(&self) -> bool {
        !self.resolutions.is_empty()
    }

    /// Run the resolutions queued before this turn started.
    ///
    /// Resolutions queued while the returned work executes belong to the
    /// next turn.
    pub fn take_due(&mut self) -> Vec<DueWork> {
        let queued = self.resolutions.len();
        let mut due = Vec::new();
        for resolution in self.resolutions.drain(..queued) {
            match resolution {
                Resolution::Reload { animate } => {
                    self.pending_reloads = self.pending_reloads.saturating_sub(1);
                    if self.pending_reloads == 0 {
                        due.push(DueWork::Reload { animate });
                    }
                }
                Resolution::Layout => {
                    self.pending_layouts = self.pending_layouts.saturating_sub(1);
                    if self.pending_layouts == 0 {
                        due.push(DueWork::Layout);
                    }
                }
            }
        }
        due
    }
}
