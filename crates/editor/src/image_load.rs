//! Generation tagging for asynchronous image loads.
//!
//! Every request bumps a counter. Only a completion carrying the latest
//! generation may change the displayed image; anything older belongs to an
//! asset the user has already left.

use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub asset: usize,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLoads {
    last_issued: u64,
    in_flight: Option<LoadTicket>,
}

impl ImageLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh generation for `asset`, superseding any load in flight.
    pub fn request(&mut self, asset: usize) -> LoadTicket {
        self.last_issued += 1;
        let ticket = LoadTicket {
            asset,
            generation: self.last_issued,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    pub fn in_flight(&self) -> Option<LoadTicket> {
        self.in_flight
    }

    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }

    /// Accepts a completion if it answers the latest request.
    pub fn settle(&mut self, generation: u64) -> Option<LoadTicket> {
        match self.in_flight {
            Some(ticket) if ticket.generation == generation => {
                self.in_flight = None;
                Some(ticket)
            }
            _ => {
                debug!(
                    generation,
                    latest = self.last_issued,
                    "discarding stale image completion"
                );
                None
            }
        }
    }

    /// Keeps the in-flight ticket pointing at the same asset after a removal
    /// shifted indices down.
    pub fn shift_after_removal(&mut self, removed: usize) {
        if let Some(ticket) = self.in_flight.as_mut() {
            if ticket.asset > removed {
                ticket.asset -= 1;
            }
        }
    }

    /// Drops the in-flight load; its completion will be treated as stale.
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }
}
