// ── Typed wire models ──
//
// Serde structs matching the controller's JSON shapes. A validated
// `FormModel` converts into these with `TryFrom`; optional parts the user
// never filled in are omitted on the wire.

pub mod app;
pub mod node;
pub mod traffic_policy;

pub use app::{App, AppKind, EpaFeature, PortProto, PortProtocol};
pub use node::{Node, NodeInterfacePolicy, Nodes, interface_policy_path};
pub use traffic_policy::{
    Action, GtpFilter, IpFilter, IpModifier, MacFilter, MacModifier, Protocol, TrafficPolicy,
    TrafficRule, TrafficSelector, TrafficTarget,
};

use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::form::FormModel;

/// Decode the wire shape of `model` (blank optional parts pruned).
pub fn from_model<T: DeserializeOwned>(model: &FormModel) -> Result<T, CoreError> {
    Ok(serde_json::from_value(model.pruned().to_json())?)
}

/// Wire models that convert from a form model.
macro_rules! impl_from_model {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<&FormModel> for $ty {
                type Error = CoreError;

                fn try_from(model: &FormModel) -> Result<Self, Self::Error> {
                    from_model(model)
                }
            }
        )+
    };
}

impl_from_model!(TrafficPolicy, App, Node, Nodes, NodeInterfacePolicy);
