//! Breakpoint registry
//!
//! Owns the table of breakpoints for a session and keeps the two ways of identifying a
//! breakpoint, by address and by source location, consistent with each other. There's at most
//! one entry per address and at most one per `(file, line, column)`.
//!
//! The table is only ever changed through the operations here, everyone else gets a read only
//! view and a `breakpointsChanged` notification.

use std::collections::HashSet;

use crate::breakpoint::Breakpoint;
use crate::notifier::{self, NotifierTx};
use crate::protocol::{self, WorkerRequest, WorkerTx};

#[derive(Debug)]
pub struct BreakpointRegistry {
    breakpoints: Vec<Breakpoint>,
    worker_tx: WorkerTx,
    notifier_tx: NotifierTx,
}

impl BreakpointRegistry {
    pub fn new(worker_tx: WorkerTx, notifier_tx: NotifierTx) -> Self {
        BreakpointRegistry {
            breakpoints: vec![],
            worker_tx,
            notifier_tx,
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Toggle a breakpoint on a line of source, returns whether it's now enabled.
    ///
    /// A new breakpoint is sent to the assembler worker so it can try to resolve its address
    /// straight away.
    pub fn toggle_by_source_location(
        &mut self,
        file_id: &str,
        line_num: u32,
        column: Option<u32>,
    ) -> bool {
        match self
            .breakpoints
            .iter()
            .position(|bp| bp.matches_source(file_id, line_num, column))
        {
            Some(i) => {
                self.remove(i);
                false
            }
            None => {
                self.insert(Breakpoint::at_source(file_id.to_string(), line_num, column));
                true
            }
        }
    }

    /// Toggle a breakpoint on a machine address, returns whether it's now enabled.
    pub fn toggle_by_address(&mut self, address: u16) -> bool {
        match self
            .breakpoints
            .iter()
            .position(|bp| bp.address() == Some(address))
        {
            Some(i) => {
                self.remove(i);
                false
            }
            None => {
                self.insert(Breakpoint::at_address(address));
                true
            }
        }
    }

    fn remove(&mut self, index: usize) {
        self.breakpoints.remove(index);
        notifier::breakpoints_changed(&self.notifier_tx);
    }

    fn insert(&mut self, bp: Breakpoint) {
        self.breakpoints.push(bp.clone());
        protocol::post(
            &self.worker_tx,
            &self.notifier_tx,
            WorkerRequest::breakpoint(bp),
        );
    }

    /// Apply a breakpoint resolved by the assembler worker.
    ///
    /// An entry on the same file and line takes on the resolved address, keeping its own column.
    /// Failing that an entry at the same address takes on the resolved source location. When
    /// both exist the entry found by address is folded into the one on the source line. Unset
    /// fields never match. A resolution that matches nothing, say for a breakpoint toggled off
    /// since, changes nothing.
    pub fn apply_resolution(&mut self, resolved: &Breakpoint) {
        let by_address =
            |bp: &Breakpoint| resolved.address().is_some() && bp.address() == resolved.address();
        let by_source = |bp: &Breakpoint| {
            resolved.file_id().is_some()
                && resolved.line_num().is_some()
                && bp.file_id() == resolved.file_id()
                && bp.line_num() == resolved.line_num()
        };

        let before = self.breakpoints.clone();

        if self.breakpoints.iter().any(|bp| by_source(bp)) {
            self.breakpoints.retain(|bp| by_source(bp) || !by_address(bp));
        }

        for bp in self.breakpoints.iter_mut() {
            if by_source(&*bp) {
                bp.set_address(resolved.address());
            } else if by_address(&*bp) {
                bp.set_source(
                    resolved.file_id().map(|f| f.to_string()),
                    resolved.line_num(),
                    resolved.column(),
                );
            }
        }
        self.dedup();

        if self.breakpoints != before {
            notifier::breakpoints_changed(&self.notifier_tx);
        }
    }

    /// Drop any entry sharing an address or source location with an earlier one.
    fn dedup(&mut self) {
        let mut addresses = HashSet::new();
        let mut locations = HashSet::new();

        self.breakpoints.retain(|bp| {
            let new_address = match bp.address() {
                Some(address) => !addresses.contains(&address),
                None => true,
            };
            let new_location = match bp.source_key() {
                Some((file_id, line_num, column)) => {
                    !locations.contains(&(file_id.to_string(), line_num, column))
                }
                None => true,
            };

            if !(new_address && new_location) {
                return false;
            }

            if let Some(address) = bp.address() {
                addresses.insert(address);
            }
            if let Some((file_id, line_num, column)) = bp.source_key() {
                locations.insert((file_id.to_string(), line_num, column));
            }
            true
        });
    }

    /// Forget the address of every breakpoint on a source line, they only hold for the last
    /// build. Breakpoints set on an address are left alone.
    pub fn invalidate_source_breakpoints(&mut self) {
        for bp in self.breakpoints.iter_mut() {
            if bp.has_source_line() {
                bp.set_address(None);
            }
        }
    }

    /// Replace the whole table with the one from a fresh build
    pub fn replace_all(&mut self, breakpoints: Vec<Breakpoint>) {
        self.breakpoints = breakpoints;
        notifier::breakpoints_changed(&self.notifier_tx);
    }

    /// Remove every breakpoint
    pub fn clear(&mut self) {
        self.breakpoints.clear();
        notifier::breakpoints_changed(&self.notifier_tx);
    }
}
