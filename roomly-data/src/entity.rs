use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A backend record that can live in a client-side collection.
///
/// The id drives replace-by-id and remove-by-id reconciliation.
///
/// ```ignore
/// impl Entity for Room {
///     type Id = String;
///     fn id(&self) -> &String { &self.id }
/// }
/// ```
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Clone + PartialEq + Display + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}
