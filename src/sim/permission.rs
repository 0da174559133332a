//! Gyroscope permission flow
//!
//! Some platforms (iOS Safari) require an explicit permission request made from
//! a user gesture before orientation events are delivered. Others deliver them
//! freely, in which case the first valid reading counts as a grant.

use thiserror::Error;

/// What the platform offers for device orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionApi {
    /// `DeviceOrientationEvent.requestPermission` exists and must be called
    Required,
    /// Orientation events exist without a permission API
    Implicit,
    /// No orientation support at all
    Unsupported,
}

/// Permission state; readings are fused only while `Granted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroPermission {
    Unrequested,
    Requesting,
    Granted,
    Denied,
    /// Platform has no orientation support; terminal
    Unavailable,
}

/// Why a permission request did not produce a grant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("orientation permission refused: {0}")]
    Refused(String),
    #[error("orientation permission request failed: {0}")]
    Failed(String),
    #[error("device orientation is not supported")]
    Unsupported,
}

/// What the host should do after feeding an event into the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    /// Call the platform permission API and report back via `resolve`
    CallPlatform,
    /// Nothing to request (already granted, pending, implicit or unsupported)
    None,
}

/// Change the host should make to a card's manual "enable gyro" control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffordanceChange {
    Show,
    Hide,
}

/// Explicit permission state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroPermissionFlow {
    api: PermissionApi,
    state: GyroPermission,
    /// The once-per-engine gesture trigger has fired
    gesture_used: bool,
}

impl GyroPermissionFlow {
    pub fn new(api: PermissionApi) -> Self {
        let state = match api {
            PermissionApi::Unsupported => GyroPermission::Unavailable,
            _ => GyroPermission::Unrequested,
        };
        Self {
            api,
            state,
            gesture_used: false,
        }
    }

    pub fn api(&self) -> PermissionApi {
        self.api
    }

    pub fn state(&self) -> GyroPermission {
        self.state
    }

    /// Readings may be fused into the output
    pub fn is_granted(&self) -> bool {
        self.state == GyroPermission::Granted
    }

    /// The host should show a manual "enable gyro" control
    pub fn needs_affordance(&self) -> bool {
        self.api == PermissionApi::Required
            && matches!(
                self.state,
                GyroPermission::Unrequested | GyroPermission::Denied
            )
    }

    /// Reconcile the control this flow owns, given whether it is shown now
    pub fn affordance_change(&self, shown: bool) -> Option<AffordanceChange> {
        match (self.needs_affordance(), shown) {
            (true, false) => Some(AffordanceChange::Show),
            (false, true) => Some(AffordanceChange::Hide),
            _ => None,
        }
    }

    /// First pointer-down / touch-start. Only fires once per engine.
    pub fn on_gesture(&mut self) -> RequestAction {
        if self.gesture_used {
            return RequestAction::None;
        }
        self.gesture_used = true;
        if self.state == GyroPermission::Unrequested {
            self.begin()
        } else {
            RequestAction::None
        }
    }

    /// Explicit button press; also retries after a denial
    pub fn on_manual_request(&mut self) -> RequestAction {
        match self.state {
            GyroPermission::Unrequested | GyroPermission::Denied => self.begin(),
            _ => RequestAction::None,
        }
    }

    fn begin(&mut self) -> RequestAction {
        match self.api {
            PermissionApi::Required => {
                self.state = GyroPermission::Requesting;
                log::info!("Requesting orientation permission");
                RequestAction::CallPlatform
            }
            // Granted implicitly by the first reading
            PermissionApi::Implicit => RequestAction::None,
            PermissionApi::Unsupported => RequestAction::None,
        }
    }

    /// Result of the platform permission call
    pub fn resolve(&mut self, result: Result<(), PermissionError>) {
        if self.state != GyroPermission::Requesting {
            log::warn!("Ignoring permission result in state {:?}", self.state);
            return;
        }
        match result {
            Ok(()) => {
                self.state = GyroPermission::Granted;
                log::info!("Orientation permission granted");
            }
            Err(e) => {
                self.state = GyroPermission::Denied;
                log::warn!("{e}; falling back to pointer tilt");
            }
        }
    }

    /// A valid orientation reading arrived. Returns whether it may be used.
    pub fn on_reading(&mut self) -> bool {
        if self.api == PermissionApi::Implicit
            && matches!(
                self.state,
                GyroPermission::Unrequested | GyroPermission::Requesting
            )
        {
            self.state = GyroPermission::Granted;
            log::info!("Orientation events available, gyro tilt enabled");
        }
        self.is_granted()
    }
}

/// Interpret the string returned by `DeviceOrientationEvent.requestPermission()`
pub fn parse_permission_response(response: &str) -> Result<(), PermissionError> {
    if response == "granted" {
        Ok(())
    } else {
        Err(PermissionError::Refused(response.to_string()))
    }
}
