//! App mobility service registrations and the tracked-device projection.

use serde::{Deserialize, Serialize};

use super::common::AssociateId;
use crate::error::RegistrationError;

/// Mobility service level requested for a device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppMobilityServiceLevel {
    AppMobilityNotAllowed,
    #[default]
    AppMobilityWithConfirmation,
    AppMobilityWithoutConfirmation,
}

impl AppMobilityServiceLevel {
    pub const fn allows_mobility(self) -> bool {
        !matches!(self, Self::AppMobilityNotAllowed)
    }
}

/// Whether the user context has already been moved to the target instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextTransferState {
    #[default]
    NotTransferred,
    UserContextTransferCompleted,
}

/// One device binding declared inside a registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associate_id: Option<AssociateId>,
    #[serde(default)]
    pub app_mobility_service_level: AppMobilityServiceLevel,
    #[serde(default)]
    pub context_transfer_state: ContextTransferState,
}

/// Identity of the registering consumer: exactly one field must be set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConsumerId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mep_id: Option<String>,
}

/// Validated view of [`ServiceConsumerId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceConsumer<'a> {
    AppInstance(&'a str),
    Mep(&'a str),
}

impl ServiceConsumerId {
    pub fn app_instance(id: impl Into<String>) -> Self {
        Self { app_instance_id: Some(id.into()), mep_id: None }
    }

    pub fn mep(id: impl Into<String>) -> Self {
        Self { app_instance_id: None, mep_id: Some(id.into()) }
    }

    /// Resolves the consumer, rejecting both-set and neither-set bodies.
    pub fn consumer(&self) -> Result<ServiceConsumer<'_>, RegistrationError> {
        let app = self.app_instance_id.as_deref().filter(|s| !s.is_empty());
        let mep = self.mep_id.as_deref().filter(|s| !s.is_empty());
        match (app, mep) {
            (Some(app), None) => Ok(ServiceConsumer::AppInstance(app)),
            (None, Some(mep)) => Ok(ServiceConsumer::Mep(mep)),
            _ => Err(RegistrationError::InvalidConsumer),
        }
    }
}

/// An application mobility service registration (MEC 021 `RegistrationInfo`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_mobility_service_id: String,
    #[serde(default)]
    pub device_information: Vec<DeviceInformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_consumer_id: Option<ServiceConsumerId>,
}

impl RegistrationInfo {
    /// Checks the request-level invariants shared by create and replace.
    pub fn validate(&self) -> Result<ServiceConsumer<'_>, RegistrationError> {
        let consumer = self
            .service_consumer_id
            .as_ref()
            .ok_or(RegistrationError::MissingConsumer)?
            .consumer()?;

        for (index, device) in self.device_information.iter().enumerate() {
            let has_value = device.associate_id.as_ref().is_some_and(|id| !id.value.is_empty());
            if !has_value {
                return Err(RegistrationError::MissingAssociateId { index });
            }
        }

        Ok(consumer)
    }

    /// Consumer application instance id, empty for MEP-scoped registrations.
    pub fn consumer_app_instance_id(&self) -> &str {
        match self.service_consumer_id.as_ref().map(ServiceConsumerId::consumer) {
            Some(Ok(ServiceConsumer::AppInstance(id))) => id,
            _ => "",
        }
    }

    pub fn consumer_mep_id(&self) -> &str {
        match self.service_consumer_id.as_ref().map(ServiceConsumerId::consumer) {
            Some(Ok(ServiceConsumer::Mep(id))) => id,
            _ => "",
        }
    }

    /// Tracked-device projections for every binding, unassigned.
    ///
    /// Bindings without an associate id are skipped; `validate` rejects them first.
    pub fn tracked_devices(&self) -> Vec<TrackedDevice> {
        self.device_information
            .iter()
            .filter_map(|device| {
                let associate_id = device.associate_id.clone()?;
                Some(TrackedDevice {
                    associate_id,
                    service_level: device.app_mobility_service_level,
                    context_transfer_state: device.context_transfer_state,
                    owner_app_instance_id: String::new(),
                    mobility_service_id: self.app_mobility_service_id.clone(),
                    consumer_app_instance_id: self.consumer_app_instance_id().to_string(),
                    consumer_mep_id: self.consumer_mep_id().to_string(),
                })
            })
            .collect()
    }
}

/// Live ownership record for one device under one registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedDevice {
    pub associate_id: AssociateId,
    pub service_level: AppMobilityServiceLevel,
    pub context_transfer_state: ContextTransferState,
    /// Owning application instance, empty while unassigned.
    #[serde(default)]
    pub owner_app_instance_id: String,
    pub mobility_service_id: String,
    #[serde(default)]
    pub consumer_app_instance_id: String,
    #[serde(default)]
    pub consumer_mep_id: String,
}

impl TrackedDevice {
    pub fn address(&self) -> &str {
        &self.associate_id.value
    }

    pub fn is_unassigned(&self) -> bool {
        self.owner_app_instance_id.is_empty()
    }

    pub const fn allows_mobility(&self) -> bool {
        self.service_level.allows_mobility()
    }

    pub fn transfer_completed(&self) -> bool {
        self.context_transfer_state == ContextTransferState::UserContextTransferCompleted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "test assertions")]
mod tests {
    use super::*;

    fn registration(consumer: ServiceConsumerId) -> RegistrationInfo {
        RegistrationInfo {
            app_mobility_service_id: "1".to_string(),
            device_information: vec![DeviceInformation {
                associate_id: Some(AssociateId::ipv4("10.0.0.1")),
                app_mobility_service_level: AppMobilityServiceLevel::AppMobilityWithConfirmation,
                context_transfer_state: ContextTransferState::NotTransferred,
            }],
            expiry_time: None,
            service_consumer_id: Some(consumer),
        }
    }

    #[test]
    fn test_exactly_one_consumer() {
        assert!(registration(ServiceConsumerId::app_instance("app-1")).validate().is_ok());
        assert!(registration(ServiceConsumerId::mep("mep1")).validate().is_ok());

        let both = ServiceConsumerId {
            app_instance_id: Some("app-1".to_string()),
            mep_id: Some("mep1".to_string()),
        };
        assert_eq!(registration(both).validate(), Err(RegistrationError::InvalidConsumer));
        assert_eq!(
            registration(ServiceConsumerId::default()).validate(),
            Err(RegistrationError::InvalidConsumer)
        );
    }

    #[test]
    fn test_empty_string_counts_as_absent() {
        let consumer = ServiceConsumerId {
            app_instance_id: Some(String::new()),
            mep_id: Some("mep1".to_string()),
        };
        assert_eq!(registration(consumer).validate(), Ok(ServiceConsumer::Mep("mep1")));
    }

    #[test]
    fn test_missing_associate_id_rejected() {
        let mut reg = registration(ServiceConsumerId::app_instance("app-1"));
        reg.device_information[0].associate_id = Some(AssociateId::ipv4(""));
        assert_eq!(reg.validate(), Err(RegistrationError::MissingAssociateId { index: 0 }));
    }

    #[test]
    fn test_tracked_devices_projection() {
        let reg = registration(ServiceConsumerId::app_instance("app-1"));
        let devices = reg.tracked_devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].address(), "10.0.0.1");
        assert_eq!(devices[0].consumer_app_instance_id, "app-1");
        assert!(devices[0].consumer_mep_id.is_empty());
        assert!(devices[0].is_unassigned());
    }

    #[test]
    fn test_service_level_wire_format() {
        let json = serde_json::to_value(AppMobilityServiceLevel::AppMobilityNotAllowed).unwrap();
        assert_eq!(json, "APP_MOBILITY_NOT_ALLOWED");
        let state: ContextTransferState =
            serde_json::from_value(serde_json::json!("USER_CONTEXT_TRANSFER_COMPLETED")).unwrap();
        assert_eq!(state, ContextTransferState::UserContextTransferCompleted);
    }
}
