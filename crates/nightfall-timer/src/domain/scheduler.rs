//! Night sub-phase scheduling.
//!
//! The scheduler partitions a night of `total` seconds into groups of
//! sub-phases. Groups run one after the other in ascending `order`; the window
//! members of a group share one time window, full-night members span the
//! whole night. Group windows tile the night exactly: integer rounding residue
//! goes to the last group.
//!
//! Two manual operations reshape a running night, skipping a sub-phase and
//! changing the night's length. Both pin the layout so that the tick-driven
//! [`PhaseScheduler::refresh`] only updates activity flags until the next
//! night is loaded. Every mutation takes `&mut self`, so a refresh and a
//! manual reallocation cannot interleave.

use std::collections::BTreeSet;

use nightfall_core::error::DomainError;
use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::{PhaseDefinition, PhaseSpan, WOLVES_PHASE_ID, role_matches};

/// A scheduled slice of the night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPhase {
    /// Stable identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Share of the night, in percent.
    pub share_percent: u32,
    /// Priority slot; sub-phases with the same order form a group.
    pub order: u32,
    /// Start, in seconds since the night began.
    pub start_offset: u32,
    /// End (exclusive), in seconds since the night began.
    pub end_offset: u32,
    /// Length in seconds.
    pub duration: u32,
    /// Whether the sub-phase is running at the current elapsed time.
    pub active: bool,
    /// Window or full-night.
    pub span: PhaseSpan,
    /// Role names served by the sub-phase.
    pub roles: Vec<String>,
    /// Set once the moderator skipped it; a skipped sub-phase stays inactive.
    pub skipped: bool,
}

impl SubPhase {
    fn from_definition(definition: &PhaseDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            label: definition.label.clone(),
            share_percent: definition.share_percent,
            order: definition.order,
            start_offset: 0,
            end_offset: 0,
            duration: 0,
            active: false,
            span: definition.span,
            roles: definition.roles.clone(),
            skipped: false,
        }
    }

    fn is_window(&self) -> bool {
        self.span == PhaseSpan::Window
    }

    fn place(&mut self, start: u32, duration: u32) {
        self.start_offset = start;
        self.duration = duration;
        self.end_offset = start.saturating_add(duration);
    }
}

/// `floor(total * percent / 100)` without intermediate overflow.
fn portion(total: u32, percent: u32) -> u32 {
    let value = u64::from(total) * u64::from(percent) / 100;
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// `round(part / total * 100)`, zero for an empty night.
fn percent_of(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let total = u64::from(total);
    let value = (u64::from(part) * 100 + total / 2) / total;
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Schedules the sub-phases of the current night.
#[derive(Debug, Clone, Default)]
pub struct PhaseScheduler {
    phases: Vec<SubPhase>,
    laid_out_for: Option<u32>,
    pinned: bool,
}

impl PhaseScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheduled sub-phases, ordered by group.
    #[must_use]
    pub fn phases(&self) -> &[SubPhase] {
        &self.phases
    }

    /// Looks up a sub-phase by id.
    #[must_use]
    pub fn phase(&self, id: &str) -> Option<&SubPhase> {
        self.phases.iter().find(|p| p.id == id)
    }

    /// Ids of the sub-phases currently running.
    #[must_use]
    pub fn active_ids(&self) -> Vec<&str> {
        self.phases
            .iter()
            .filter(|p| p.active)
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Whether a manual reallocation is in force.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Removes every sub-phase.
    pub fn clear(&mut self) {
        self.phases.clear();
        self.laid_out_for = None;
        self.pinned = false;
    }

    /// Builds the night `night_number` from `catalog` and lays it out over
    /// `total` seconds. Definitions inactive on that night are dropped.
    pub fn load(&mut self, catalog: &[PhaseDefinition], night_number: u32, total: u32) {
        let mut phases: Vec<SubPhase> = catalog
            .iter()
            .filter(|d| d.activation.is_active_on(night_number))
            .map(SubPhase::from_definition)
            .collect();
        phases.sort_by_key(|p| p.order);

        self.phases = phases;
        self.pinned = false;
        self.recompute(total);
        self.refresh_activity(0);
        debug!(night_number, total, count = self.phases.len(), "night schedule loaded");
    }

    fn orders(&self) -> BTreeSet<u32> {
        self.phases.iter().map(|p| p.order).collect()
    }

    fn has_window_members(&self, order: u32) -> bool {
        self.phases.iter().any(|p| p.order == order && p.is_window())
    }

    /// The share of a group's window: the largest share among its window
    /// members.
    fn group_share(&self, order: u32) -> u32 {
        self.phases
            .iter()
            .filter(|p| p.order == order && p.is_window())
            .map(|p| p.share_percent)
            .max()
            .unwrap_or(0)
    }

    fn window_members_mut(&mut self, order: u32) -> impl Iterator<Item = &mut SubPhase> {
        self.phases
            .iter_mut()
            .filter(move |p| p.order == order && p.is_window())
    }

    /// Lays every group out over `total` seconds from the start of the night.
    pub fn recompute(&mut self, total: u32) {
        let mut cursor: u32 = 0;
        let mut absorber: Option<u32> = None;

        for order in self.orders() {
            let share = self.group_share(order);
            let has_window = self.has_window_members(order);
            if has_window && share == 0 {
                warn!(order, "sub-phase group has a zero share; scheduling it with no time");
            }

            let window = portion(total, share).min(total - cursor);
            for phase in self.phases.iter_mut().filter(|p| p.order == order) {
                match phase.span {
                    PhaseSpan::Window => phase.place(cursor, window),
                    PhaseSpan::FullNight => phase.place(0, total),
                }
            }

            if has_window {
                cursor += window;
                if share > 0 {
                    absorber = Some(order);
                }
            }
        }

        let residue = total - cursor;
        if let Some(order) = absorber.filter(|_| residue > 0) {
            for phase in self.window_members_mut(order) {
                phase.duration += residue;
                phase.end_offset += residue;
            }
            // Empty groups after the absorber start where it now ends.
            for phase in self
                .phases
                .iter_mut()
                .filter(|p| p.order > order && p.is_window())
            {
                phase.start_offset += residue;
                phase.end_offset += residue;
            }
        }

        self.laid_out_for = Some(total);
    }

    /// Total time covered by the group windows, counting each group once.
    /// Equals the night's length right after [`PhaseScheduler::recompute`].
    #[must_use]
    pub fn timeline_duration(&self) -> u32 {
        self.orders()
            .into_iter()
            .filter_map(|order| {
                self.phases
                    .iter()
                    .find(|p| p.order == order && p.is_window())
                    .map(|p| p.duration)
            })
            .sum()
    }

    /// Marks sub-phases active when `elapsed` falls inside their window.
    pub fn refresh_activity(&mut self, elapsed: u32) {
        for phase in &mut self.phases {
            phase.active =
                !phase.skipped && phase.start_offset <= elapsed && elapsed < phase.end_offset;
        }
    }

    /// The tick-driven step: re-lays the night when its length changed and
    /// no manual reallocation is in force, then refreshes activity.
    pub fn refresh(&mut self, total: u32, elapsed: u32) {
        if !self.pinned && self.laid_out_for != Some(total) {
            self.recompute(total);
        }
        self.refresh_activity(elapsed);
    }

    /// Ends the active sub-phase `id` now and hands its unused window, plus
    /// the next group's own share, to the next group.
    ///
    /// The next group is only reallocated once no other window member of the
    /// interrupted group is still running; full-night sub-phases are simply
    /// frozen.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SubPhaseNotFound` if `id` is not scheduled and
    /// `DomainError::Validation` if it is not active.
    pub fn skip_to_next(
        &mut self,
        id: &str,
        elapsed: u32,
        total: u32,
    ) -> Result<&[SubPhase], DomainError> {
        let index = self
            .phases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DomainError::SubPhaseNotFound(id.to_owned()))?;
        if !self.phases[index].active {
            return Err(DomainError::Validation(format!(
                "sub-phase {id} is not active"
            )));
        }

        let skipped = &mut self.phases[index];
        let interrupted_end = skipped.end_offset;
        let order = skipped.order;
        let is_window = skipped.is_window();
        let start = skipped.start_offset;
        skipped.place(start, elapsed.saturating_sub(start));
        skipped.share_percent = percent_of(skipped.duration, total);
        skipped.active = false;
        skipped.skipped = true;

        let peers_running = self
            .phases
            .iter()
            .any(|p| p.order == order && p.is_window() && p.active);

        if is_window && !peers_running {
            let next = self
                .orders()
                .into_iter()
                .find(|o| *o > order && self.has_window_members(*o));
            if let Some(next) = next {
                let unused = interrupted_end.saturating_sub(elapsed);
                let allotment = portion(total, self.group_share(next))
                    .saturating_add(unused)
                    .min(total.saturating_sub(elapsed));
                let share = percent_of(allotment, total);
                for phase in self.window_members_mut(next) {
                    phase.place(elapsed, allotment);
                    phase.share_percent = share;
                    phase.active = !phase.skipped && allotment > 0;
                }
                debug!(skipped = id, next, allotment, "reallocated interrupted window");
            }
        }

        self.pinned = true;
        Ok(self.phases.as_slice())
    }

    /// Re-plans the rest of the night after its length changed to
    /// `new_total` with `elapsed` seconds already gone.
    ///
    /// Sub-phases that have started are frozen at `elapsed` (or at their own
    /// end if they already finished). Upcoming groups are laid out one after
    /// another from `elapsed`, in proportion to their shares, over the time
    /// that remains; the last upcoming group absorbs the rounding residue.
    pub fn adjust_for_new_total(&mut self, new_total: u32, elapsed: u32) -> &[SubPhase] {
        if elapsed == 0 {
            self.recompute(new_total);
            self.refresh_activity(0);
            return &self.phases;
        }

        for phase in self.phases.iter_mut().filter(|p| p.start_offset < elapsed) {
            let end = phase.end_offset.min(elapsed);
            let start = phase.start_offset;
            phase.place(start, end - start);
        }

        let remaining = new_total.saturating_sub(elapsed);
        let upcoming: Vec<(u32, u32)> = self
            .phases
            .iter()
            .filter(|p| p.start_offset >= elapsed)
            .map(|p| p.order)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|order| (order, self.group_share(order)))
            .collect();
        let total_share: u64 = upcoming.iter().map(|(_, share)| u64::from(*share)).sum();

        if total_share == 0 && !upcoming.is_empty() {
            warn!(new_total, elapsed, "upcoming sub-phases have no share; scheduling them with no time");
        }

        let mut cursor = elapsed;
        let mut assigned: u32 = 0;
        let last = upcoming.len().checked_sub(1);
        for (position, (order, share)) in upcoming.iter().enumerate() {
            let mut window = if total_share == 0 {
                0
            } else {
                let value = u64::from(remaining) * u64::from(*share) / total_share;
                u32::try_from(value).unwrap_or(u32::MAX)
            };
            assigned += window;
            if Some(position) == last && total_share > 0 {
                window += remaining - assigned;
            }

            for phase in self
                .phases
                .iter_mut()
                .filter(|p| p.order == *order && p.start_offset >= elapsed)
            {
                match phase.span {
                    PhaseSpan::Window => phase.place(cursor, window),
                    PhaseSpan::FullNight => phase.place(elapsed, remaining),
                }
            }
            cursor += window;
        }

        self.laid_out_for = Some(new_total);
        self.pinned = true;
        self.refresh_activity(elapsed);
        &self.phases
    }

    /// The sub-phase a player with `role` takes part in, if any. A wild
    /// child whose master died hunts with the wolves.
    #[must_use]
    pub fn phase_for_role(&self, role: &str, switched_to_wolves: bool) -> Option<&str> {
        if switched_to_wolves && self.phase(WOLVES_PHASE_ID).is_some() {
            return Some(WOLVES_PHASE_ID);
        }
        self.phases
            .iter()
            .find(|p| p.roles.iter().any(|pattern| role_matches(pattern, role)))
            .map(|p| p.id.as_str())
    }
}
