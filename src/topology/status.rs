use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::{
    config::MeshStatusConfig,
    data_aquisition::TransportError,
    network::{IdentityResolver, InterfaceAddresses, LocalAddresses, NameMap},
    parsers::parse_links,
    topology::{
        scheduler::{Clock, PollReason, PollScheduler, SystemClock},
        table::{DisplayTable, MergeSummary, RowRenderer},
    },
};

/// Outcome of the last finished poll cycle, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleHealth {
    NeverPolled,
    Ok { links: usize, at: SystemTime },
    Failed { reason: String, at: SystemTime },
}

/// Everything behind the mesh status window except the widgets and the socket:
/// the table, who-is-who resolution, and the poll timer.
pub struct MeshStatus<C: Clock = SystemClock> {
    table: DisplayTable,
    resolver: IdentityResolver,
    local: Box<dyn LocalAddresses>,
    scheduler: PollScheduler<C>,
    health: CycleHealth,
}

impl MeshStatus<SystemClock> {
    pub fn from_config(config: &MeshStatusConfig) -> Self {
        let names = NameMap::with_extra(&config.extra_names);
        info!(
            known_names = names.len(),
            self_label = %config.self_label,
            "mesh status initialised"
        );
        Self::new(
            IdentityResolver::new(names, config.self_label.clone()),
            Box::new(InterfaceAddresses),
            PollScheduler::new(SystemClock, config.poll_interval, config.auto_update),
        )
    }
}

impl<C: Clock> MeshStatus<C> {
    pub fn new(
        resolver: IdentityResolver,
        local: Box<dyn LocalAddresses>,
        scheduler: PollScheduler<C>,
    ) -> Self {
        Self {
            table: DisplayTable::default(),
            resolver,
            local,
            scheduler,
            health: CycleHealth::NeverPolled,
        }
    }

    /// A message arrived: parse it, resolve both ends of every link, fold into the table.
    pub fn on_message(&mut self, text: &str) -> MergeSummary {
        // interfaces can come and go, so this is re-read every cycle
        let local = self.local.local_addresses();
        let resolver = &self.resolver;
        let records = parse_links(text).map(|rec| resolver.resolve_record(rec, &local));

        let now = SystemTime::now();
        let summary = self.table.merge(records, now);
        debug!(
            bytes = text.len(),
            updated = summary.updated,
            appended = summary.appended,
            rows = self.table.len(),
            "merged poll result"
        );
        self.health = CycleHealth::Ok {
            links: summary.total(),
            at: now,
        };
        summary
    }

    /// The poll failed; the table stays as it is until a later cycle succeeds.
    pub fn on_failure(&mut self, err: &TransportError) {
        warn!(error = %err, "poll failed, keeping current table");
        self.health = CycleHealth::Failed {
            reason: err.to_string(),
            at: SystemTime::now(),
        };
    }

    pub fn update_clicked(&mut self) {
        self.scheduler.trigger();
    }

    pub fn auto_update_changed(&mut self, enabled: bool) {
        info!(enabled, "auto update toggled");
        self.scheduler.set_auto(enabled);
    }

    pub fn take_due_poll(&mut self) -> Option<PollReason> {
        self.scheduler.take_due_poll()
    }

    pub fn time_until_next_poll(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    pub fn is_auto_update(&self) -> bool {
        self.scheduler.is_auto()
    }

    pub fn render_into<R: RowRenderer + ?Sized>(&self, renderer: &mut R) {
        self.table.render_into(renderer);
    }

    pub fn table(&self) -> &DisplayTable {
        &self.table
    }

    pub fn clear_table(&mut self) {
        self.table.clear();
    }

    pub fn health(&self) -> &CycleHealth {
        &self.health
    }
}
