//! Cascading deletion of an owner's dependent records.
//!
//! When the fleet announces that an owning entity (a child, or an
//! institution) was deleted, every dependent aggregate this service holds
//! must go too. The fan-out is best effort: each target is attempted
//! independently, failures are logged per target, and the triggering event
//! is always treated as handled. Re-running the fan-out is a no-op, so
//! at-most-once deletion per store degrades safely to at-least-once
//! attempts.

use crate::messaging::bus::{EventBus, EventHandler};
use crate::models::MeasurementType;
use crate::storage::{ActivityStore, EnvironmentStore, MeasurementStore, SleepStore};
use crate::validation;
use std::sync::Arc;

/// Per-target outcome of one fan-out, kept for observability.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    /// Name of the dependent store.
    pub target: &'static str,
    /// Error text when the removal failed.
    pub error: Option<String>,
}

impl CascadeOutcome {
    /// True when the target's removal succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A dependent store the orchestrator can clear for one owner.
trait CascadeTarget: Send + Sync {
    fn name(&self) -> &'static str;
    fn remove_all_for_owner(&self, owner_id: &str) -> anyhow::Result<()>;
}

struct ActivityTarget(Arc<dyn ActivityStore>);

impl CascadeTarget for ActivityTarget {
    fn name(&self) -> &'static str {
        "activities"
    }

    fn remove_all_for_owner(&self, owner_id: &str) -> anyhow::Result<()> {
        self.0.remove_all_for_child(owner_id)?;
        Ok(())
    }
}

struct SleepTarget(Arc<dyn SleepStore>);

impl CascadeTarget for SleepTarget {
    fn name(&self) -> &'static str {
        "sleep"
    }

    fn remove_all_for_owner(&self, owner_id: &str) -> anyhow::Result<()> {
        self.0.remove_all_for_child(owner_id)?;
        Ok(())
    }
}

/// A kind-scoped view over the shared measurement collection.
struct MeasurementTarget {
    store: Arc<dyn MeasurementStore>,
    measurement_type: MeasurementType,
}

impl CascadeTarget for MeasurementTarget {
    fn name(&self) -> &'static str {
        match self.measurement_type {
            MeasurementType::Weight => "weights",
            MeasurementType::BodyFat => "body_fats",
        }
    }

    fn remove_all_for_owner(&self, owner_id: &str) -> anyhow::Result<()> {
        self.store
            .remove_all_for_child(owner_id, self.measurement_type)?;
        Ok(())
    }
}

struct EnvironmentTarget(Arc<dyn EnvironmentStore>);

impl CascadeTarget for EnvironmentTarget {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn remove_all_for_owner(&self, owner_id: &str) -> anyhow::Result<()> {
        self.0.remove_all_for_institution(owner_id)?;
        Ok(())
    }
}

/// Fans an owner deletion out to every dependent store.
pub struct CascadeDeleteOrchestrator {
    targets: Vec<Box<dyn CascadeTarget>>,
}

impl CascadeDeleteOrchestrator {
    /// Orchestrator for a deleted child: activities, sleep, body-fat and
    /// weight records.
    #[must_use]
    pub fn for_child(
        activities: Arc<dyn ActivityStore>,
        sleep: Arc<dyn SleepStore>,
        measurements: Arc<dyn MeasurementStore>,
    ) -> Self {
        Self {
            targets: vec![
                Box::new(ActivityTarget(activities)),
                Box::new(SleepTarget(sleep)),
                Box::new(MeasurementTarget {
                    store: Arc::clone(&measurements),
                    measurement_type: MeasurementType::BodyFat,
                }),
                Box::new(MeasurementTarget {
                    store: measurements,
                    measurement_type: MeasurementType::Weight,
                }),
            ],
        }
    }

    /// Orchestrator for a deleted institution: environment readings.
    #[must_use]
    pub fn for_institution(environment: Arc<dyn EnvironmentStore>) -> Self {
        Self {
            targets: vec![Box::new(EnvironmentTarget(environment))],
        }
    }

    /// Clears every dependent store for the deleted owner.
    ///
    /// An invalid owner id stops the whole fan-out before any target is
    /// touched. Otherwise each target is attempted regardless of the
    /// others' outcomes; the returned record of per-target results is for
    /// observability only and carries no failure semantics for the caller.
    pub fn on_owner_deleted(&self, owner_id: &str) -> Vec<CascadeOutcome> {
        if !validation::is_valid_subject_id(owner_id) {
            tracing::warn!(owner_id, "invalid owner id in deletion event, skipping cascade");
            return Vec::new();
        }

        self.targets
            .iter()
            .map(|target| match target.remove_all_for_owner(owner_id) {
                Ok(()) => {
                    tracing::debug!(owner_id, store = target.name(), "cascade removal done");
                    CascadeOutcome {
                        target: target.name(),
                        error: None,
                    }
                }
                Err(err) => {
                    tracing::error!(
                        owner_id,
                        store = target.name(),
                        error = %err,
                        "cascade removal failed"
                    );
                    CascadeOutcome {
                        target: target.name(),
                        error: Some(err.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Subscribes the orchestrator to an owner-deleted routing key.
    ///
    /// The handler extracts the owner id from the event payload and runs
    /// the fan-out; events without an id are logged and dropped.
    pub fn subscribe(self: Arc<Self>, bus: &dyn EventBus, routing_key: &str) -> bool {
        let handler: EventHandler = Arc::new(move |event| {
            match event.payload_id() {
                Some(owner_id) => {
                    self.on_owner_deleted(owner_id);
                }
                None => {
                    tracing::warn!(
                        event = %event.event_name,
                        "owner-deleted event without an id, skipping cascade"
                    );
                }
            }
        });
        bus.subscribe(routing_key, handler)
    }
}
