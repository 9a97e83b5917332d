//! Socket volume reconciliation

use k8s_openapi::api::core::v1::{CSIVolumeSource, Pod, Volume};
use tracing::debug;

use super::{pod_spec_mut, Reconcile};
use crate::constants::{CSI_DRIVER, WORKLOAD_SOCKET};
use crate::error::MutationError;

/// What the volume reconciler decided to do with a Pod's volume list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAction {
    /// No socket volume and no volume bound to the driver: append one
    Append,
    /// A `workload-socket` volume exists but is not the canonical one:
    /// put the canonical volume in the first one's slot and drop the rest
    Replace,
    /// The `workload-socket` volume is already canonical
    Converged,
    /// The driver is already bound under a different volume name
    DriverBoundElsewhere,
}

impl VolumeAction {
    /// Decide from a single scan of the Pod's volumes
    ///
    /// `name_exists` and `driver_bound` are tracked independently so that
    /// "nothing here", "something here but wrong" and "already correct" stay
    /// distinguishable. The socket volume only counts as converged when it is
    /// declared once and is the canonical volume itself; a driver bound under
    /// another name never rescues a misconfigured `workload-socket`.
    pub fn plan(volumes: &[Volume]) -> Self {
        let mut named = 0usize;
        let mut name_canonical = true;
        let mut driver_bound = false;

        for volume in volumes {
            if volume.name == WORKLOAD_SOCKET {
                named += 1;
                name_canonical &= is_canonical(volume);
            }
            if volume.csi.as_ref().is_some_and(|csi| csi.driver == CSI_DRIVER) {
                driver_bound = true;
            }
        }

        let name_exists = named > 0;
        match (name_exists, driver_bound) {
            (false, false) => Self::Append,
            (true, false) => Self::Replace,
            (true, true) if named == 1 && name_canonical => Self::Converged,
            (true, true) => Self::Replace,
            (false, true) => Self::DriverBoundElsewhere,
        }
    }
}

/// The `workload-socket` volume backed by the SPIFFE CSI driver, read-only
pub fn socket_volume() -> Volume {
    Volume {
        name: WORKLOAD_SOCKET.to_string(),
        csi: Some(CSIVolumeSource {
            driver: CSI_DRIVER.to_string(),
            read_only: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn is_canonical(volume: &Volume) -> bool {
    volume
        .csi
        .as_ref()
        .is_some_and(|csi| csi.driver == CSI_DRIVER && csi.read_only == Some(true))
}

/// Ensures exactly one canonical `workload-socket` volume is declared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeReconciler;

impl Reconcile for VolumeReconciler {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn reconcile(&self, pod: &mut Pod) -> Result<(), MutationError> {
        let spec = pod_spec_mut(pod, self.name())?;
        let action = VolumeAction::plan(spec.volumes.as_deref().unwrap_or_default());
        debug!(stage = self.name(), ?action, "planned socket volume");

        match action {
            VolumeAction::Append => {
                spec.volumes.get_or_insert_with(Vec::new).push(socket_volume());
            }
            VolumeAction::Replace => {
                let volumes = spec.volumes.get_or_insert_with(Vec::new);
                let slot = volumes
                    .iter()
                    .position(|v| v.name == WORKLOAD_SOCKET)
                    .unwrap_or(volumes.len());
                volumes.retain(|v| v.name != WORKLOAD_SOCKET);
                volumes.insert(slot, socket_volume());
            }
            VolumeAction::Converged | VolumeAction::DriverBoundElsewhere => {}
        }
        Ok(())
    }
}
